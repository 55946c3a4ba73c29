//! Remove command - revoke card UIDs

use crate::audit::{events, AuditLog};
use crate::cli::args::UidArgs;
use crate::cli::commands::{open_store, parse_uids};
use crate::config::Config;
use crate::error::CacheResult;
use console::style;

/// Execute the remove command
pub async fn execute(args: UidArgs, config: &Config) -> CacheResult<()> {
    let uids = parse_uids(&args.uids)?;
    let mut store = open_store(config)?;
    let audit = AuditLog::new(config);

    for uid in uids {
        match store.remove(&uid)? {
            0 => println!("{} {} not cached", style("•").dim(), uid),
            1 => {
                println!("{} {} removed", style("✓").green(), uid);
                audit
                    .log(
                        events::UID_REMOVED,
                        &serde_json::json!({ "uid": uid, "entries": 1 }),
                    )
                    .await;
            }
            n => {
                println!(
                    "{} {} removed ({} duplicate entries scrubbed)",
                    style("✓").green(),
                    uid,
                    n
                );
                audit
                    .log(
                        events::UID_REMOVED,
                        &serde_json::json!({ "uid": uid, "entries": n }),
                    )
                    .await;
            }
        }
    }

    Ok(())
}
