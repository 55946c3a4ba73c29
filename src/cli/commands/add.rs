//! Add command - authorise card UIDs

use crate::audit::{events, AuditLog};
use crate::cli::args::UidArgs;
use crate::cli::commands::{open_store, parse_uids};
use crate::config::Config;
use crate::error::CacheResult;
use console::style;

/// Execute the add command
pub async fn execute(args: UidArgs, config: &Config) -> CacheResult<()> {
    let uids = parse_uids(&args.uids)?;
    let mut store = open_store(config)?;
    let audit = AuditLog::new(config);

    for uid in uids {
        if store.add(&uid)? {
            println!("{} {} added", style("✓").green(), uid);
            audit
                .log(events::UID_ADDED, &serde_json::json!({ "uid": uid }))
                .await;
        } else {
            println!("{} {} already authorised", style("•").dim(), uid);
        }
    }

    Ok(())
}
