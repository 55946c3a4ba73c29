//! cardcache - access card UID cache
//!
//! Keeps the set of card UIDs allowed to operate a machine in a single
//! fixed-width record file on the node's flash filesystem.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod sync;
pub mod uid;

pub use error::{CacheError, CacheResult};
pub use store::{RecordStore, Slot};
pub use uid::Uid;
