//! Permission sync
//!
//! Brings the local cache in line with the authoritative list of cards
//! allowed on this machine. The list is plain text, one UID per line:
//!
//! ```text
//! # members inducted on the laser cutter
//! 04A1B2C3
//! DEADBEEF
//! ```

use crate::error::{CacheError, CacheResult};
use crate::store::{Flash, Record, RecordStore};
use crate::uid::Uid;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Set of UIDs granted access to this machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionList {
    uids: BTreeSet<Uid>,
}

impl PermissionList {
    /// Parse a permission list, skipping blank lines and `#` comments
    pub fn parse(text: &str) -> CacheResult<Self> {
        let mut uids = BTreeSet::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let uid = Uid::parse(line.trim()).map_err(|e| CacheError::PermissionList {
                line: index + 1,
                reason: e.to_string(),
            })?;
            if !uids.insert(uid) {
                debug!("Duplicate UID {} in permission list", uid);
            }
        }
        Ok(Self { uids })
    }

    pub fn contains(&self, uid: &Uid) -> bool {
        self.uids.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uid> {
        self.uids.iter()
    }
}

impl FromIterator<Uid> for PermissionList {
    fn from_iter<I: IntoIterator<Item = Uid>>(iter: I) -> Self {
        Self {
            uids: iter.into_iter().collect(),
        }
    }
}

/// Changes needed to make the cache match a permission list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub to_add: Vec<Uid>,
    pub to_remove: Vec<Uid>,
    pub unchanged: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Outcome of applying a [`SyncPlan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: usize,
    /// Records scrubbed, counting duplicates individually
    pub removed: usize,
}

/// UIDs currently live in the cache, deduplicated
pub fn cached_uids<F: Flash>(store: &RecordStore<F>) -> CacheResult<BTreeSet<Uid>> {
    Ok(store
        .records()?
        .into_iter()
        .filter_map(|(_, record)| match record {
            Record::Live(uid) => Some(uid),
            _ => None,
        })
        .collect())
}

/// Work out which UIDs to add and which to remove
pub fn plan<F: Flash>(store: &RecordStore<F>, list: &PermissionList) -> CacheResult<SyncPlan> {
    let cached = cached_uids(store)?;

    let to_add: Vec<Uid> = list.uids.difference(&cached).copied().collect();
    let to_remove: Vec<Uid> = cached.difference(&list.uids).copied().collect();
    let unchanged = cached.intersection(&list.uids).count();

    debug!(
        "Sync plan: {} to add, {} to remove, {} unchanged",
        to_add.len(),
        to_remove.len(),
        unchanged
    );
    Ok(SyncPlan {
        to_add,
        to_remove,
        unchanged,
    })
}

/// Apply a plan, removals first so freed slots are reused by the additions
pub fn apply<F: Flash>(store: &mut RecordStore<F>, plan: &SyncPlan) -> CacheResult<SyncReport> {
    let mut report = SyncReport::default();

    for uid in &plan.to_remove {
        report.removed += store.remove(uid)?;
    }
    for uid in &plan.to_add {
        if store.add(uid)? {
            report.added += 1;
        }
    }

    info!(
        "Permission sync applied: {} added, {} removed",
        report.added, report.removed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemFlash, HEADER};

    fn uid(s: &str) -> Uid {
        Uid::parse(s).unwrap()
    }

    fn store_with(uids: &[&str]) -> (RecordStore<MemFlash>, MemFlash) {
        let flash = MemFlash::new(0);
        let mut store = RecordStore::new(flash.clone(), "authcache.txt");
        store.initialize(false).unwrap();
        for s in uids {
            store.add(&uid(s)).unwrap();
        }
        (store, flash)
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let list = PermissionList::parse("# header\n\n04A1B2C3\r\n  DEADBEEF  \n04A1B2C3\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&uid("04A1B2C3")));
        assert!(list.contains(&uid("DEADBEEF")));
    }

    #[test]
    fn parse_reports_line_number() {
        let err = PermissionList::parse("04A1B2C3\n\nTOOLONGUID\n").unwrap_err();
        match err {
            CacheError::PermissionList { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_list_parses() {
        assert!(PermissionList::parse("").unwrap().is_empty());
    }

    #[test]
    fn plan_diffs_cache_against_list() {
        let (store, _flash) = store_with(&["AAAAAAAA", "BBBBBBBB"]);
        let list: PermissionList = [uid("BBBBBBBB"), uid("CCCCCCCC")].into_iter().collect();

        let plan = plan(&store, &list).unwrap();

        assert_eq!(plan.to_add, vec![uid("CCCCCCCC")]);
        assert_eq!(plan.to_remove, vec![uid("AAAAAAAA")]);
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn apply_reuses_freed_slots() {
        let (mut store, flash) = store_with(&["AAAAAAAA", "BBBBBBBB"]);
        let list: PermissionList = [uid("BBBBBBBB"), uid("CCCCCCCC")].into_iter().collect();

        let plan = plan(&store, &list).unwrap();
        let report = apply(&mut store, &plan).unwrap();

        assert_eq!(report, SyncReport { added: 1, removed: 1 });
        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(b"CCCCCCCC\r\nBBBBBBBB\r\n");
        assert_eq!(flash.contents("authcache.txt").unwrap(), expected);
    }

    #[test]
    fn in_sync_cache_needs_nothing() {
        let (store, _flash) = store_with(&["AAAAAAAA"]);
        let list = PermissionList::parse("AAAAAAAA\n").unwrap();
        assert!(plan(&store, &list).unwrap().is_empty());
    }

    #[test]
    fn duplicates_in_cache_are_all_removed() {
        let (mut store, flash) = store_with(&[]);
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(b"AAAAAAAA\r\nAAAAAAAA\r\n");
        flash.put("authcache.txt", bytes);

        let plan = plan(&store, &PermissionList::default()).unwrap();
        assert_eq!(plan.to_remove, vec![uid("AAAAAAAA")]);

        let report = apply(&mut store, &plan).unwrap();
        assert_eq!(report.removed, 2);
    }
}
