//! Card identifiers
//!
//! A [`Uid`] is the fixed-width text form of an access card's serial number.
//! Width is checked once, when the string is parsed, so the record store only
//! ever compares values that fit a slot exactly.

use crate::error::{CacheError, CacheResult};
use crate::store::layout::UID_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-character access card identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid([u8; UID_WIDTH]);

impl Uid {
    /// Parse a UID, rejecting anything that would not fit a record slot
    pub fn parse(s: &str) -> CacheResult<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != UID_WIDTH {
            return Err(CacheError::invalid_uid(
                s,
                format!("expected {} characters, got {}", UID_WIDTH, s.chars().count()),
            ));
        }
        Self::from_payload(bytes).ok_or_else(|| {
            CacheError::invalid_uid(s, "must be printable ASCII and not all spaces")
        })
    }

    /// Interpret a record payload as a UID
    ///
    /// Returns `None` for blank (tombstone) payloads and for payloads holding
    /// control or non-ASCII bytes.
    pub(crate) fn from_payload(payload: &[u8]) -> Option<Self> {
        let raw: [u8; UID_WIDTH] = payload.try_into().ok()?;
        if !raw.iter().all(|b| (0x20..=0x7e).contains(b)) || raw.iter().all(|&b| b == b' ') {
            return None;
        }
        Some(Self(raw))
    }

    /// The payload bytes as stored on flash
    pub fn as_bytes(&self) -> &[u8; UID_WIDTH] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only printable ASCII gets past `from_payload`.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Uid {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = CacheError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.as_str().to_string()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eight_characters() {
        let uid = Uid::parse("04A1B2C3").unwrap();
        assert_eq!(uid.as_str(), "04A1B2C3");
        assert_eq!(uid.to_string(), "04A1B2C3");
        assert_eq!(uid.as_bytes(), b"04A1B2C3");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Uid::parse("1234567").is_err());
        assert!(Uid::parse("123456789").is_err());
        assert!(Uid::parse("").is_err());
    }

    #[test]
    fn rejects_tombstone_pattern() {
        let err = Uid::parse("        ").unwrap_err();
        assert!(matches!(err, CacheError::InvalidUid { .. }));
    }

    #[test]
    fn rejects_control_and_non_ascii() {
        assert!(Uid::parse("1234567\r").is_err());
        assert!(Uid::parse("1234\n678").is_err());
        // Eight bytes, but not eight ASCII characters
        assert!(Uid::parse("1234é56").is_err());
    }

    #[test]
    fn allows_inner_spaces() {
        assert!(Uid::parse("AB CD EF").is_ok());
    }

    #[test]
    fn serde_uses_plain_string() {
        let uid: Uid = "DEADBEEF".parse().unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"DEADBEEF\"");
        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
        assert!(serde_json::from_str::<Uid>("\"short\"").is_err());
    }
}
