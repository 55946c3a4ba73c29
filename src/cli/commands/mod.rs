//! CLI command implementations

pub mod add;
pub mod check;
pub mod clear;
pub mod config;
pub mod init;
pub mod list;
pub mod remove;
pub mod status;
pub mod sync;

pub use add::execute as add;
pub use check::execute as check;
pub use clear::execute as clear;
pub use config::execute as config;
pub use init::execute as init;
pub use list::execute as list;
pub use remove::execute as remove;
pub use status::execute as status;
pub use sync::execute as sync;

use crate::config::{Config, ConfigManager};
use crate::error::{CacheError, CacheResult};
use crate::store::{DirFlash, RecordStore};
use crate::uid::Uid;
use std::path::PathBuf;

/// Directory emulating the flash filesystem
pub(crate) fn flash_dir(config: &Config) -> PathBuf {
    config
        .cache
        .dir
        .clone()
        .unwrap_or_else(ConfigManager::flash_dir)
}

/// Mount the flash directory and bind the store, without initializing it
pub(crate) fn mount(config: &Config) -> CacheResult<RecordStore<DirFlash>> {
    let dir = flash_dir(config);
    let flash = DirFlash::mount(dir.clone(), config.cache.capacity_bytes)
        .map_err(|e| CacheError::io(format!("mounting flash at {}", dir.display()), e))?;
    Ok(RecordStore::new(flash, config.cache.file.clone()))
}

/// Mount and initialize the store, as the node does at boot
pub(crate) fn open_store(config: &Config) -> CacheResult<RecordStore<DirFlash>> {
    let mut store = mount(config)?;
    store.initialize(false)?;
    Ok(store)
}

/// Validate every UID before any of them touches the cache
pub(crate) fn parse_uids(raw: &[String]) -> CacheResult<Vec<Uid>> {
    raw.iter().map(|s| Uid::parse(s)).collect()
}
