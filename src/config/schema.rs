//! Configuration schema for cardcache
//!
//! Configuration is stored at `~/.config/cardcache/config.toml`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Machine this node controls
    pub device: DeviceConfig,

    /// WiFi and permission server settings
    pub network: NetworkConfig,

    /// UID cache storage
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging of cache changes
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// How an authorised card enables the machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Output enabled only while the card is in reading distance.
    /// For machines needing constant supervision (CNC router, laser cutter).
    #[default]
    Present,
    /// Output stays enabled until the latch input reaches its disable state.
    /// For machines that can run unattended (3D printers, saws).
    Latch,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Latch => write!(f, "latch"),
        }
    }
}

/// Logic level of the latch input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinLevel {
    #[default]
    Low,
    High,
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Device identity and authorisation behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Identifier of this machine on the permission server
    pub machine_uid: String,

    /// Authorisation model
    pub auth_mode: AuthMode,

    /// Latch input level that disables the output (latch mode only)
    pub latch_disable_state: PinLevel,
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// WiFi network name
    pub ssid: String,

    /// WiFi passphrase
    pub pass: String,

    /// Permission server host
    pub perms_uri: String,

    /// Permission server port
    pub perms_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            pass: String::new(),
            perms_uri: String::new(),
            perms_port: 5000,
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory emulating the flash filesystem (default: state dir)
    pub dir: Option<PathBuf>,

    /// Cache file name on the flash filesystem
    pub file: String,

    /// Flash capacity reported in status output
    pub capacity_bytes: u64,

    /// Wipe the flash filesystem whenever `init` runs
    pub format_on_start: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file: "authcache.txt".to_string(),
            capacity_bytes: 3 * 1024 * 1024,
            format_on_start: false,
        }
    }
}
