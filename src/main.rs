//! cardcache - access card UID cache
//!
//! CLI entry point that dispatches to subcommands.

use cardcache::cli::{Cli, Commands};
use cardcache::config::schema::GeneralConfig;
use cardcache::config::ConfigManager;
use cardcache::error::CacheResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let mut config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general);
    debug!("Using config {}", config_manager.path().display());

    if let Some(dir) = cli.dir {
        debug!("Flash directory overridden: {}", dir.display());
        config.cache.dir = Some(dir);
    }

    match cli.command {
        Commands::Init(args) => cardcache::cli::commands::init(args, &config).await,
        Commands::Add(args) => cardcache::cli::commands::add(args, &config).await,
        Commands::Remove(args) => cardcache::cli::commands::remove(args, &config).await,
        Commands::Check(args) => cardcache::cli::commands::check(args, &config).await,
        Commands::List(args) => cardcache::cli::commands::list(args, &config).await,
        Commands::Clear(args) => cardcache::cli::commands::clear(args, &config).await,
        Commands::Sync(args) => cardcache::cli::commands::sync(args, &config).await,
        Commands::Status => cardcache::cli::commands::status(&config).await,
        Commands::Config(args) => {
            cardcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, general: &GeneralConfig) {
    let level = match verbose {
        0 if general.verbose => 1,
        n => n,
    };
    let filter = match level {
        0 => EnvFilter::new("cardcache=warn"),
        1 => EnvFilter::new("cardcache=info"),
        _ => EnvFilter::new("cardcache=debug"),
    };

    if general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}
