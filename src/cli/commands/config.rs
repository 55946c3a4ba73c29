//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::schema::{AuthMode, PinLevel};
use crate::config::{Config, ConfigManager};
use crate::error::{CacheError, CacheResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> CacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> CacheResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("⚠").yellow(),
            path.display()
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized: {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> CacheResult<()> {
    let mut config = config.clone();
    apply_value(&mut config, key, value)?;
    manager.save(&config).await?;
    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}

/// Apply a dot-separated key assignment to the configuration
fn apply_value(config: &mut Config, key: &str, value: &str) -> CacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(CacheError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["device", "machine_uid"] => config.device.machine_uid = value.to_string(),
        ["device", "auth_mode"] => config.device.auth_mode = parse_auth_mode(value)?,
        ["device", "latch_disable_state"] => {
            config.device.latch_disable_state = parse_pin_level(value)?
        }

        ["network", "ssid"] => config.network.ssid = value.to_string(),
        ["network", "pass"] => config.network.pass = value.to_string(),
        ["network", "perms_uri"] => config.network.perms_uri = value.to_string(),
        ["network", "perms_port"] => {
            config.network.perms_port = value
                .parse()
                .map_err(|_| CacheError::User(format!("Invalid port: {}", value)))?
        }

        ["cache", "dir"] => config.cache.dir = Some(PathBuf::from(value)),
        ["cache", "file"] => config.cache.file = value.to_string(),
        ["cache", "capacity_bytes"] => {
            config.cache.capacity_bytes = value
                .parse()
                .map_err(|_| CacheError::User(format!("Invalid number: {}", value)))?
        }
        ["cache", "format_on_start"] => config.cache.format_on_start = parse_bool(value)?,

        _ => {
            eprintln!("Valid keys:");
            print_valid_keys();
            return Err(CacheError::User(format!("Unknown config key: {}", key)));
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> CacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CacheError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_auth_mode(value: &str) -> CacheResult<AuthMode> {
    match value.to_lowercase().as_str() {
        "present" => Ok(AuthMode::Present),
        "latch" => Ok(AuthMode::Latch),
        _ => Err(CacheError::User(format!(
            "Invalid auth mode: {}. Use present/latch",
            value
        ))),
    }
}

fn parse_pin_level(value: &str) -> CacheResult<PinLevel> {
    match value.to_lowercase().as_str() {
        "low" | "0" => Ok(PinLevel::Low),
        "high" | "1" => Ok(PinLevel::High),
        _ => Err(CacheError::User(format!(
            "Invalid pin level: {}. Use low/high",
            value
        ))),
    }
}

fn print_valid_keys() {
    let keys = [
        "general.verbose",
        "general.log_format",
        "general.audit_log",
        "device.machine_uid",
        "device.auth_mode",
        "device.latch_disable_state",
        "network.ssid",
        "network.pass",
        "network.perms_uri",
        "network.perms_port",
        "cache.dir",
        "cache.file",
        "cache.capacity_bytes",
        "cache.format_on_start",
    ];

    for key in keys {
        eprintln!("  {}", key);
    }
}
