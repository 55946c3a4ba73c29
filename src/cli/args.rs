//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cardcache - access card UID cache for machine control nodes
///
/// Maintains the flash-resident list of card UIDs allowed to operate
/// a machine.
#[derive(Parser, Debug)]
#[command(name = "cardcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CARDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory emulating the flash filesystem
    #[arg(short, long, global = true, env = "CARDCACHE_DIR")]
    pub dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the cache file if missing, optionally formatting flash first
    Init(InitArgs),

    /// Authorise one or more card UIDs
    Add(UidArgs),

    /// Revoke one or more card UIDs
    Remove(UidArgs),

    /// Check whether a card UID is authorised
    Check(CheckArgs),

    /// List cached UIDs
    List(ListArgs),

    /// Delete every cached UID
    Clear(ClearArgs),

    /// Bring the cache in line with a permission list
    Sync(SyncArgs),

    /// Show flash usage and cache statistics
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Wipe the whole flash filesystem first (irrecoverable)
    #[arg(long)]
    pub format: bool,
}

/// Arguments for the add and remove commands
#[derive(Parser, Debug)]
pub struct UidArgs {
    /// Card UIDs (8 characters each)
    #[arg(required = true)]
    pub uids: Vec<String>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Card UID (8 characters)
    pub uid: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include free and corrupt slots
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Permission list file, one UID per line ("-" reads stdin)
    pub source: PathBuf,

    /// Show what would change without touching the cache
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., device.auth_mode)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
