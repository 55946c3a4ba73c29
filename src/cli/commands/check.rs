//! Check command - is a card allowed on this machine?

use crate::cli::args::CheckArgs;
use crate::cli::commands::open_store;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::uid::Uid;
use console::style;

/// Execute the check command
///
/// Fails with [`CacheError::NotAuthorised`] when the UID is not cached, so
/// scripts can rely on the exit status.
pub async fn execute(args: CheckArgs, config: &Config) -> CacheResult<()> {
    let uid = Uid::parse(&args.uid)?;
    let store = open_store(config)?;

    match store.exists(&uid)? {
        Some(slot) => {
            println!(
                "{} {} authorised (slot {}, offset {})",
                style("✓").green(),
                uid,
                slot.index(),
                slot.offset()
            );
            Ok(())
        }
        None => Err(CacheError::NotAuthorised(uid.to_string())),
    }
}
