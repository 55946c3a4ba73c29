//! Persistent store of authorised card UIDs
//!
//! The whole cache is one flat file on flash: a header line followed by
//! fixed-width records (see [`layout`]). There is no in-memory index; every
//! operation opens the file, scans it from the first record, and closes it
//! again before returning.
//!
//! # Record lifecycle
//!
//! | Event | Effect on file |
//! |-------|----------------|
//! | add, free slot exists | first free slot overwritten |
//! | add, no free slot | record written at the end |
//! | remove | payload overwritten with spaces |
//! | clear | file deleted, recreated header-only |
//!
//! The file never shrinks except through [`RecordStore::clear`] or a format.

pub mod flash;
pub mod layout;
pub mod memory;

pub use flash::{format_bytes, DirFlash, Flash, FlashUsage, OpenMode};
pub use layout::{Record, Slot, HEADER, HEADER_LEN, RECORD_WIDTH, TOMBSTONE, UID_WIDTH};
pub use memory::MemFlash;

use crate::error::{CacheError, CacheResult};
use crate::uid::Uid;
use layout::RecordReader;
use std::fmt;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use tracing::{debug, info, warn};

/// Result of a flash format requested during initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    NotRequested,
    Formatted,
    /// Format failed; initialization carried on regardless
    Failed(String),
}

impl fmt::Display for FormatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => write!(f, "not requested"),
            Self::Formatted => write!(f, "formatted"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// What [`RecordStore::initialize`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// A fresh header-only file was written
    pub created: bool,
    pub format: FormatOutcome,
}

/// Record counts for a cache file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub live: usize,
    pub free: usize,
    pub corrupt: usize,
    /// Bytes of an incomplete record at the end of the file
    pub torn_bytes: usize,
    pub file_bytes: u64,
}

impl StoreStats {
    pub fn slots(&self) -> usize {
        self.live + self.free + self.corrupt
    }
}

/// UID cache backed by a single file on a [`Flash`] filesystem
///
/// Mutating operations take `&mut self`, so only one scan can hold the file
/// open at a time.
pub struct RecordStore<F: Flash> {
    flash: F,
    file: String,
}

impl<F: Flash> RecordStore<F> {
    /// Bind a store to `file` on `flash`. Nothing is touched until
    /// [`initialize`](Self::initialize) runs.
    pub fn new(flash: F, file: impl Into<String>) -> Self {
        Self {
            flash,
            file: file.into(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Make sure the cache file exists and starts with its header
    ///
    /// With `format` set, the whole flash filesystem is wiped first. A failed
    /// format is reported but does not stop initialization. An existing file
    /// is left as it is unless it is too short to hold the header.
    pub fn initialize(&mut self, format: bool) -> CacheResult<InitReport> {
        match self.flash.usage() {
            Ok(usage) => debug!(
                "Flash: {} total, {} used, {} free",
                format_bytes(usage.total_bytes),
                format_bytes(usage.used_bytes),
                format_bytes(usage.free_bytes())
            ),
            Err(e) => debug!("Flash usage unavailable: {}", e),
        }

        let format = if format {
            match self.flash.format() {
                Ok(()) => {
                    info!("Formatted flash filesystem");
                    FormatOutcome::Formatted
                }
                Err(e) => {
                    warn!("Flash format failed: {}", e);
                    FormatOutcome::Failed(e.to_string())
                }
            }
        } else {
            FormatOutcome::NotRequested
        };

        let created = match self.flash.open(&self.file, OpenMode::ReadWrite) {
            Ok(file) => self.inspect(file)?,
            Err(e) => {
                debug!("Cache file {} not found ({}), creating it", self.file, e);
                self.create()?;
                true
            }
        };

        Ok(InitReport { created, format })
    }

    /// Find the first live record holding `uid`
    pub fn exists(&self, uid: &Uid) -> CacheResult<Option<Slot>> {
        for entry in self.open_records(OpenMode::Read)? {
            let (slot, record) = entry.map_err(|e| self.read_error(e))?;
            if record.is_live(uid) {
                debug!("Found {} at {}", uid, slot);
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Add `uid` unless it is already cached
    ///
    /// Returns `false` when the UID was already present.
    pub fn add(&mut self, uid: &Uid) -> CacheResult<bool> {
        if let Some(slot) = self.exists(uid)? {
            debug!("{} already cached at {}", uid, slot);
            return Ok(false);
        }

        let slot = self.write_record(uid)?;
        info!("Added {} at {}", uid, slot);
        Ok(true)
    }

    /// Scrub every record holding `uid`, returning how many were scrubbed
    ///
    /// `add` never stores duplicates, but a torn write or a hand-edited file
    /// can; each pass rescans from the first record until none are left.
    pub fn remove(&mut self, uid: &Uid) -> CacheResult<usize> {
        let mut removed = 0;
        while let Some(slot) = self.exists(uid)? {
            self.scrub(slot)?;
            removed += 1;
            info!("Removed {} from {}", uid, slot);
        }
        debug!("Removed {} entries for {}", removed, uid);
        Ok(removed)
    }

    /// Delete the cache file and recreate it empty
    ///
    /// Returns `false`, leaving storage untouched, when the file cannot be
    /// deleted.
    pub fn clear(&mut self) -> CacheResult<bool> {
        if let Err(e) = self.flash.remove(&self.file) {
            warn!("Could not delete cache file {}: {}", self.file, e);
            return Ok(false);
        }

        info!("Deleted cache file {}", self.file);
        self.initialize(false)?;
        Ok(true)
    }

    /// Every complete record in file order
    pub fn records(&self) -> CacheResult<Vec<(Slot, Record)>> {
        self.open_records(OpenMode::Read)?
            .map(|entry| entry.map_err(|e| self.read_error(e)))
            .collect()
    }

    pub fn stats(&self) -> CacheResult<StoreStats> {
        let mut stats = StoreStats::default();
        let mut records = self.open_records(OpenMode::Read)?;
        for entry in records.by_ref() {
            let (_, record) = entry.map_err(|e| self.read_error(e))?;
            match record {
                Record::Live(_) => stats.live += 1,
                Record::Free => stats.free += 1,
                Record::Corrupt => stats.corrupt += 1,
            }
        }
        stats.torn_bytes = records.torn_bytes();
        stats.file_bytes = records.end_slot().offset() + stats.torn_bytes as u64;
        Ok(stats)
    }

    /// Write `uid` into the first free slot, or after the last full record
    fn write_record(&mut self, uid: &Uid) -> CacheResult<Slot> {
        let mut records = self.open_records(OpenMode::ReadWrite)?;

        let mut free = None;
        for entry in records.by_ref() {
            let (slot, record) = entry.map_err(|e| self.read_error(e))?;
            if record == Record::Free {
                free = Some(slot);
                break;
            }
        }

        let slot = match free {
            Some(slot) => {
                debug!("Reusing free slot {}", slot);
                slot
            }
            None => {
                if records.torn_bytes() > 0 {
                    warn!(
                        "Overwriting {} bytes of a torn record in {}",
                        records.torn_bytes(),
                        self.file
                    );
                }
                records.end_slot()
            }
        };

        let mut file = records.into_inner().into_inner();
        self.overwrite(&mut file, slot, &Record::encode(uid.as_bytes()))?;
        Ok(slot)
    }

    /// Overwrite the payload at `slot` with the tombstone, keeping the terminator
    fn scrub(&mut self, slot: Slot) -> CacheResult<()> {
        let mut file = self
            .flash
            .open(&self.file, OpenMode::ReadWrite)
            .map_err(|e| self.unavailable(e))?;
        self.overwrite(&mut file, slot, &TOMBSTONE)
    }

    fn overwrite(&self, file: &mut F::File, slot: Slot, bytes: &[u8]) -> CacheResult<()> {
        file.seek(SeekFrom::Start(slot.offset()))
            .map_err(|e| self.unavailable(e))?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| CacheError::io(format!("writing {} in {}", slot, self.file), e))
    }

    /// Open the file positioned at the first record
    ///
    /// A file too short to hold the header has not been initialized and is
    /// refused outright.
    fn open_records(&self, mode: OpenMode) -> CacheResult<RecordReader<BufReader<F::File>>> {
        let mut file = self
            .flash
            .open(&self.file, mode)
            .map_err(|e| self.unavailable(e))?;

        let len = file
            .seek(SeekFrom::End(0))
            .map_err(|e| self.unavailable(e))?;
        if len < HEADER_LEN {
            return Err(CacheError::NotInitialized(self.file.clone()));
        }

        file.seek(SeekFrom::Start(HEADER_LEN))
            .map_err(|e| self.unavailable(e))?;
        Ok(RecordReader::new(BufReader::new(file)))
    }

    fn create(&self) -> CacheResult<()> {
        let mut file = self
            .flash
            .open(&self.file, OpenMode::Create)
            .map_err(|e| self.unavailable(e))?;
        file.write_all(HEADER)
            .and_then(|()| file.flush())
            .map_err(|e| self.unavailable(e))?;
        info!("Created cache file {}", self.file);
        Ok(())
    }

    /// Check an existing file's header and list its records at debug level
    ///
    /// Returns `true` if the file had to be recreated.
    fn inspect(&self, mut file: F::File) -> CacheResult<bool> {
        let mut header = Vec::with_capacity(HEADER.len());
        (&mut file)
            .take(HEADER_LEN)
            .read_to_end(&mut header)
            .map_err(|e| self.read_error(e))?;

        if header.len() < HEADER.len() {
            warn!(
                "Cache file {} is shorter than its header, recreating it",
                self.file
            );
            drop(file);
            self.create()?;
            return Ok(true);
        }
        if header != HEADER {
            warn!("Cache file {} has an unexpected header", self.file);
        }

        debug!("Current authorised UIDs in {}", self.file);
        for entry in RecordReader::new(BufReader::new(file)) {
            let (slot, record) = entry.map_err(|e| self.read_error(e))?;
            debug!("{}\t{}", slot.offset(), record);
        }
        Ok(false)
    }

    fn unavailable(&self, source: io::Error) -> CacheError {
        CacheError::storage(self.file.clone(), source)
    }

    fn read_error(&self, source: io::Error) -> CacheError {
        CacheError::io(format!("reading cache file {}", self.file), source)
    }
}
