//! Error types for cardcache
//!
//! All modules use `CacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cardcache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in cardcache
#[derive(Error, Debug)]
pub enum CacheError {
    // Storage errors
    #[error("Cache storage unavailable: {file}: {source}")]
    StorageUnavailable {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {0} is missing its header")]
    NotInitialized(String),

    // Identifier errors
    #[error("Invalid UID {uid:?}: {reason}")]
    InvalidUid { uid: String, reason: String },

    #[error("UID not authorised: {0}")]
    NotAuthorised(String),

    #[error("Invalid permission list at line {line}: {reason}")]
    PermissionList { line: usize, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage unavailable error for a cache file
    pub fn storage(file: impl Into<String>, source: std::io::Error) -> Self {
        Self::StorageUnavailable {
            file: file.into(),
            source,
        }
    }

    /// Create an invalid UID error
    pub fn invalid_uid(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUid {
            uid: uid.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. } | Self::Io { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::StorageUnavailable { .. } => {
                Some("Run: cardcache init --format (erases the flash filesystem)")
            }
            Self::NotInitialized(_) => Some("Run: cardcache init"),
            Self::InvalidUid { .. } => Some("UIDs are exactly 8 printable ASCII characters"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CacheError::invalid_uid("123", "expected 8 characters, got 3");
        assert!(err.to_string().contains("Invalid UID \"123\""));
    }

    #[test]
    fn error_hint() {
        let err = CacheError::NotInitialized("authcache.txt".to_string());
        assert_eq!(err.hint(), Some("Run: cardcache init"));
        assert_eq!(CacheError::User("x".to_string()).hint(), None);
    }

    #[test]
    fn error_retryable() {
        let err = CacheError::storage(
            "authcache.txt",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.is_retryable());
        assert!(!CacheError::NotAuthorised("12345678".to_string()).is_retryable());
    }
}
