//! Clear command - revoke every cached UID

use crate::audit::{events, AuditLog};
use crate::cli::args::ClearArgs;
use crate::cli::commands::open_store;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use console::style;
use std::io::{self, Write};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> CacheResult<()> {
    let mut store = open_store(config)?;
    let stats = store.stats()?;

    if stats.slots() == 0 && stats.torn_bytes == 0 {
        println!("Cache is already empty.");
        return Ok(());
    }

    println!(
        "This will revoke {} authorised UID(s) from {}.",
        stats.live,
        store.file()
    );

    if !args.yes {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if !store.clear()? {
        return Err(CacheError::User(format!(
            "Could not delete cache file {}",
            store.file()
        )));
    }

    AuditLog::new(config)
        .log(
            events::CACHE_CLEARED,
            &serde_json::json!({ "revoked": stats.live }),
        )
        .await;
    println!("{} Cleared {} UID(s)", style("✓").green(), stats.live);

    Ok(())
}
