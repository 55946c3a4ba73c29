//! Init command - create the cache file, optionally formatting flash first

use crate::audit::{events, AuditLog};
use crate::cli::args::InitArgs;
use crate::cli::commands::{flash_dir, mount};
use crate::config::Config;
use crate::error::CacheResult;
use crate::store::FormatOutcome;
use console::style;

/// Execute the init command
pub async fn execute(args: InitArgs, config: &Config) -> CacheResult<()> {
    let format = args.format || config.cache.format_on_start;
    let mut store = mount(config)?;
    let report = store.initialize(format)?;

    match &report.format {
        FormatOutcome::NotRequested => {}
        FormatOutcome::Formatted => {
            println!("{} Flash formatted", style("✓").green());
            AuditLog::new(config)
                .log(
                    events::CACHE_FORMATTED,
                    &serde_json::json!({ "dir": flash_dir(config) }),
                )
                .await;
        }
        FormatOutcome::Failed(reason) => {
            println!("{} Flash format failed: {}", style("⚠").yellow(), reason);
        }
    }

    if report.created {
        println!(
            "{} Created {} in {}",
            style("✓").green(),
            store.file(),
            flash_dir(config).display()
        );
    } else {
        let stats = store.stats()?;
        println!(
            "{} {} ready ({} authorised, {} free slots)",
            style("✓").green(),
            store.file(),
            stats.live,
            stats.free
        );
    }

    Ok(())
}
