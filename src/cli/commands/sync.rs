//! Sync command - apply an authoritative permission list

use crate::audit::{events, AuditLog};
use crate::cli::args::SyncArgs;
use crate::cli::commands::open_store;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::sync::{self, PermissionList};
use console::style;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config) -> CacheResult<()> {
    let text = read_source(&args.source).await?;
    let list = PermissionList::parse(&text)?;
    debug!("Permission list holds {} UIDs", list.len());

    let mut store = open_store(config)?;
    let plan = sync::plan(&store, &list)?;

    if plan.is_empty() {
        println!(
            "{} Cache already matches permission list ({} UIDs)",
            style("✓").green(),
            plan.unchanged
        );
        return Ok(());
    }

    for uid in &plan.to_add {
        println!("  {} {}", style("+").green(), uid);
    }
    for uid in &plan.to_remove {
        println!("  {} {}", style("-").red(), uid);
    }

    if args.dry_run {
        println!();
        println!("Dry run - cache not modified.");
        return Ok(());
    }

    let report = sync::apply(&mut store, &plan)?;
    AuditLog::new(config)
        .log(events::CACHE_SYNCED, &serde_json::to_value(&plan)?)
        .await;

    println!();
    println!(
        "{} Synced: {} added, {} removed, {} unchanged",
        style("✓").green(),
        report.added,
        report.removed,
        plan.unchanged
    );
    Ok(())
}

async fn read_source(source: &Path) -> CacheResult<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| CacheError::io("reading permission list from stdin", e))?;
        return Ok(text);
    }

    tokio::fs::read_to_string(source).await.map_err(|e| {
        CacheError::io(
            format!("reading permission list {}", source.display()),
            e,
        )
    })
}
