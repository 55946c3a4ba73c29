//! Flash filesystem primitives used by the record store
//!
//! The store only needs a handful of synchronous operations: open a named
//! file in one of three modes, delete it, wipe the whole filesystem, and
//! report usage. [`DirFlash`] provides them on top of a host directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// How a flash file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read only; fails if the file is absent
    Read,
    /// Read and update in place; fails if the file is absent
    ReadWrite,
    /// Create or truncate, then read and write
    Create,
}

/// Filesystem primitives the record store is built on
pub trait Flash {
    type File: Read + Write + Seek;

    fn open(&self, name: &str, mode: OpenMode) -> io::Result<Self::File>;

    fn remove(&self, name: &str) -> io::Result<()>;

    /// Erase every file on the filesystem
    fn format(&self) -> io::Result<()>;

    fn usage(&self) -> io::Result<FlashUsage>;
}

/// Space accounting for a flash filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl FlashUsage {
    pub fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    /// Percentage of capacity in use
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }

    /// Whether usage has crossed 80% of capacity
    pub fn is_nearly_full(&self) -> bool {
        self.total_bytes > 0 && self.percentage() >= 80.0
    }
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Flash filesystem emulated by a host directory
///
/// File names are flat: anything that is not a single plain path component
/// is rejected with [`io::ErrorKind::InvalidInput`].
#[derive(Debug, Clone)]
pub struct DirFlash {
    root: PathBuf,
    capacity_bytes: u64,
}

impl DirFlash {
    /// Mount `root` as a flash filesystem, creating the directory if needed
    pub fn mount(root: impl Into<PathBuf>, capacity_bytes: u64) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("Mounted flash at {}", root.display());
        Ok(Self {
            root,
            capacity_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        let name = name.trim_start_matches('/');
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid flash file name: {:?}", name),
            )),
        }
    }
}

impl Flash for DirFlash {
    type File = File;

    fn open(&self, name: &str, mode: OpenMode) -> io::Result<File> {
        let path = self.path_for(name)?;
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::ReadWrite => options.read(true).write(true),
            OpenMode::Create => options.read(true).write(true).create(true).truncate(true),
        };
        options.open(path)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.path_for(name)?)
    }

    fn format(&self) -> io::Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    fn usage(&self) -> io::Result<FlashUsage> {
        let mut used_bytes = 0;
        for entry in fs::read_dir(&self.root)? {
            let metadata = entry?.metadata()?;
            if metadata.is_file() {
                used_bytes += metadata.len();
            }
        }
        Ok(FlashUsage {
            total_bytes: self.capacity_bytes,
            used_bytes,
        })
    }
}
