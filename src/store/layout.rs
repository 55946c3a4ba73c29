//! On-flash layout of the cache file
//!
//! ```text
//! offset 0   "AUTH UID\r\n"     header, never matched as data
//! offset 10  "04A1B2C3\r\n"     slot 0, live
//! offset 20  "        \r\n"     slot 1, free (tombstone)
//! offset 30  "DEADBEEF\r\n"     slot 2, live
//! ```
//!
//! Every record is exactly [`RECORD_WIDTH`] bytes, so a record's position is
//! derived from its slot index alone.

use crate::uid::Uid;
use std::fmt;
use std::io::{self, Read};

/// Payload width of a record: the length of a card UID
pub const UID_WIDTH: usize = 8;

/// Line terminator written after every line
pub const TERMINATOR: &[u8; 2] = b"\r\n";

/// Total on-flash width of one record
pub const RECORD_WIDTH: usize = UID_WIDTH + TERMINATOR.len();

/// Header line occupying the start of the file
pub const HEADER: &[u8] = b"AUTH UID\r\n";

/// Length of the header line in bytes
pub const HEADER_LEN: u64 = HEADER.len() as u64;

/// Payload of a free slot
pub const TOMBSTONE: [u8; UID_WIDTH] = [b' '; UID_WIDTH];

/// Position of a record, counted in records from the end of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u64);

impl Slot {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u64 {
        self.0
    }

    /// Absolute byte offset of the record's payload
    pub fn offset(&self) -> u64 {
        HEADER_LEN + self.0 * RECORD_WIDTH as u64
    }

    /// Slot following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} @{}", self.0, self.offset())
    }
}

/// Contents of one record slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    /// Slot holds an authorised card
    Live(Uid),
    /// Slot was scrubbed and may be reused
    Free,
    /// Bytes that are neither a UID nor a tombstone (torn or foreign write)
    Corrupt,
}

impl Record {
    /// Classify the raw bytes of a full record
    pub fn classify(raw: &[u8; RECORD_WIDTH]) -> Self {
        let (payload, terminator) = raw.split_at(UID_WIDTH);
        if terminator != TERMINATOR {
            return Self::Corrupt;
        }
        if payload == TOMBSTONE.as_slice() {
            return Self::Free;
        }
        Uid::from_payload(payload).map_or(Self::Corrupt, Self::Live)
    }

    /// Encode a record payload with its terminator
    pub fn encode(payload: &[u8; UID_WIDTH]) -> [u8; RECORD_WIDTH] {
        let mut raw = [0u8; RECORD_WIDTH];
        raw[..UID_WIDTH].copy_from_slice(payload);
        raw[UID_WIDTH..].copy_from_slice(TERMINATOR);
        raw
    }

    pub fn is_live(&self, uid: &Uid) -> bool {
        matches!(self, Self::Live(live) if live == uid)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(uid) => write!(f, "{}", uid),
            Self::Free => write!(f, "free"),
            Self::Corrupt => write!(f, "corrupt"),
        }
    }
}

/// Sequential reader over the record region of a cache file
///
/// The reader must be positioned at the first record (just past the header).
/// A trailing fragment shorter than a record ends the scan and is remembered
/// in [`RecordReader::torn_bytes`].
pub struct RecordReader<R> {
    inner: R,
    slot: Slot,
    torn: usize,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            slot: Slot::new(0),
            torn: 0,
            done: false,
        }
    }

    /// Slot a new record would be appended at, once the scan has finished
    pub fn end_slot(&self) -> Slot {
        self.slot
    }

    /// Bytes of an incomplete trailing record
    pub fn torn_bytes(&self) -> usize {
        self.torn
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_record(&mut self) -> io::Result<Option<[u8; RECORD_WIDTH]>> {
        let mut raw = [0u8; RECORD_WIDTH];
        let mut filled = 0;
        while filled < RECORD_WIDTH {
            match self.inner.read(&mut raw[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled == RECORD_WIDTH {
            Ok(Some(raw))
        } else {
            self.torn = filled;
            Ok(None)
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = io::Result<(Slot, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(raw)) => {
                let slot = self.slot;
                self.slot = slot.next();
                Some(Ok((slot, Record::classify(&raw))))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
