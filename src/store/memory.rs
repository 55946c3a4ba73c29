//! RAM-backed flash filesystem
//!
//! Mirrors [`DirFlash`](super::flash::DirFlash) without touching the host
//! disk. Handles are cheap clones sharing one filesystem, so a caller can
//! keep a handle to inspect or corrupt files behind the store's back, and
//! can switch individual primitives into failure to exercise error paths.

use super::flash::{Flash, FlashUsage, OpenMode};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

type Blob = Rc<RefCell<Vec<u8>>>;

#[derive(Debug, Default)]
struct MemState {
    files: BTreeMap<String, Blob>,
    capacity_bytes: u64,
    fail_open: bool,
    fail_remove: bool,
    fail_format: bool,
}

/// In-memory flash filesystem
#[derive(Debug, Clone, Default)]
pub struct MemFlash {
    state: Rc<RefCell<MemState>>,
}

impl MemFlash {
    pub fn new(capacity_bytes: u64) -> Self {
        let flash = Self::default();
        flash.state.borrow_mut().capacity_bytes = capacity_bytes;
        flash
    }

    /// Snapshot of a file's bytes
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        state.files.get(name).map(|blob| blob.borrow().clone())
    }

    /// Replace a file's bytes, creating it if needed
    pub fn put(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        let blob = Rc::new(RefCell::new(bytes.into()));
        self.state.borrow_mut().files.insert(name.to_string(), blob);
    }

    /// Make every open fail, as an unmounted or dead flash chip would
    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.state.borrow_mut().fail_remove = fail;
    }

    pub fn fail_format(&self, fail: bool) {
        self.state.borrow_mut().fail_format = fail;
    }
}

fn injected(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("{} refused", what))
}

impl Flash for MemFlash {
    type File = MemFile;

    fn open(&self, name: &str, mode: OpenMode) -> io::Result<MemFile> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(injected("open"));
        }

        let blob = if mode == OpenMode::Create {
            let blob: Blob = Rc::default();
            state.files.insert(name.to_string(), Rc::clone(&blob));
            blob
        } else {
            state
                .files
                .get(name)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?
        };

        Ok(MemFile {
            blob,
            pos: 0,
            writable: mode != OpenMode::Read,
        })
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_remove {
            return Err(injected("remove"));
        }
        state
            .files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn format(&self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_format {
            return Err(injected("format"));
        }
        state.files.clear();
        Ok(())
    }

    fn usage(&self) -> io::Result<FlashUsage> {
        let state = self.state.borrow();
        let used_bytes = state
            .files
            .values()
            .map(|blob| blob.borrow().len() as u64)
            .sum();
        Ok(FlashUsage {
            total_bytes: state.capacity_bytes,
            used_bytes,
        })
    }
}

/// Open handle on a [`MemFlash`] file
#[derive(Debug)]
pub struct MemFile {
    blob: Blob,
    pos: u64,
    writable: bool,
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.blob.borrow();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file opened read-only",
            ));
        }
        let mut data = self.blob.borrow_mut();
        let start = self.pos as usize;
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.blob.borrow().len() as i64;
        let target = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(delta) => len + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
