//! Status command - flash usage, cache health and device settings

use crate::cli::commands::{flash_dir, open_store};
use crate::config::schema::AuthMode;
use crate::config::Config;
use crate::error::CacheResult;
use crate::store::{format_bytes, Flash, RECORD_WIDTH};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(config: &Config) -> CacheResult<()> {
    println!("{}", style("cardcache Status").bold().cyan());
    println!();

    let store = open_store(config)?;

    println!("{}", style("Flash:").bold());
    println!("  Directory: {}", flash_dir(config).display());
    match store.flash().usage() {
        Ok(usage) => {
            let marker = if usage.is_nearly_full() { &WARN } else { &CHECK };
            println!(
                "  {}{} used of {} ({:.1}%), {} free",
                marker,
                format_bytes(usage.used_bytes),
                format_bytes(usage.total_bytes),
                usage.percentage(),
                format_bytes(usage.free_bytes())
            );
        }
        Err(e) => println!("  {}Usage unavailable: {}", CROSS, e),
    }

    println!();
    println!("{}", style("Cache:").bold());
    let stats = store.stats()?;
    println!("  File: {} ({})", store.file(), format_bytes(stats.file_bytes));
    println!("  {}{} authorised UID(s)", CHECK, stats.live);
    println!(
        "  {} free slot(s), reclaimable {}",
        stats.free,
        format_bytes((stats.free * RECORD_WIDTH) as u64)
    );
    if stats.corrupt > 0 {
        println!("  {}{} corrupt record(s)", WARN, stats.corrupt);
    }
    if stats.torn_bytes > 0 {
        println!(
            "  {}{} byte(s) of a torn record at end of file",
            WARN, stats.torn_bytes
        );
    }

    println!();
    println!("{}", style("Device:").bold());
    let machine = if config.device.machine_uid.is_empty() {
        style("(not set)".to_string()).dim().to_string()
    } else {
        config.device.machine_uid.clone()
    };
    println!("  Machine: {}", machine);
    match config.device.auth_mode {
        AuthMode::Present => println!("  Auth mode: present"),
        AuthMode::Latch => println!(
            "  Auth mode: latch (disables on {})",
            config.device.latch_disable_state
        ),
    }
    if !config.network.perms_uri.is_empty() {
        println!(
            "  Permission server: {}:{}",
            config.network.perms_uri, config.network.perms_port
        );
    }

    Ok(())
}
