//! Audit logging for cache changes
//!
//! Writes JSON lines to `~/.local/state/cardcache/audit.log`. Every change to
//! the set of cards allowed on the machine is recorded unless disabled.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Audit event names
pub mod events {
    pub const UID_ADDED: &str = "uid.added";
    pub const UID_REMOVED: &str = "uid.removed";
    pub const CACHE_CLEARED: &str = "cache.cleared";
    pub const CACHE_FORMATTED: &str = "cache.formatted";
    pub const CACHE_SYNCED: &str = "cache.synced";
}

/// File-based audit logger that appends JSON lines
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
    machine_uid: String,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
            machine_uid: config.device.machine_uid.clone(),
        }
    }

    /// Log an audit event as a JSON line
    ///
    /// IO failures are logged and dropped; the cache change has already
    /// happened by the time it is audited.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "machine": self.machine_uid,
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
