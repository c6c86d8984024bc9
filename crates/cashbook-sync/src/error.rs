//! # Sync Error Types
//!
//! Error types for the mirror client, work queue and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Rejected               │ │
//! │  │  MissingIdentity│  │  Timeout        │  │  SerializationFailed    │ │
//! │  │  InvalidUrl     │  │  HttpStatus     │  │  DeserializationFailed  │ │
//! │  │  MirrorDisabled │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │     Queue       │   Mutations never see these: mirror failures      │
//! │  │                 │   only move SyncStatus. They surface from the     │
//! │  │  QueueFull      │   explicit actions (test, init, pull) and from    │
//! │  │  ShuttingDown   │   config loading.                                 │
//! │  │  Internal       │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all mirror and config failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No acting identity configured.
    #[error("No user identity configured. Pass --user or set [user] identity.")]
    MissingIdentity,

    /// Invalid mirror endpoint URL.
    #[error("Invalid mirror URL: {0}")]
    InvalidUrl(String),

    /// Mirror requested but not enabled / no endpoint.
    #[error("Spreadsheet mirror is not configured")]
    MirrorDisabled,

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be sent.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// Endpoint answered with a non-2xx status.
    #[error("Mirror endpoint returned HTTP {0}")]
    HttpStatus(u16),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Endpoint answered `"success": false`.
    #[error("Mirror rejected request: {0}")]
    Rejected(String),

    /// Failed to serialize a request.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Failed to read a response.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Queue Errors
    // =========================================================================
    /// Work queue at capacity; job dropped.
    #[error("Mirror queue is full")]
    QueueFull,

    /// Work queue no longer accepts jobs.
    #[error("Mirror queue is shutting down")]
    ShuttingDown,

    /// Internal error (worker panicked, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SyncError::DeserializationFailed(err.to_string())
        } else {
            SyncError::SerializationFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout
        } else if err.is_decode() {
            SyncError::DeserializationFailed(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::HttpStatus(status.as_u16())
        } else {
            SyncError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if trying again later could succeed.
    ///
    /// The queue itself never retries; this is for the operator-facing
    /// message ("try again" vs "fix your config").
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::ConnectionFailed(_)
                | SyncError::Timeout
                | SyncError::QueueFull
                | SyncError::HttpStatus(500..=599)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::MissingIdentity
                | SyncError::InvalidUrl(_)
                | SyncError::MirrorDisabled
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the endpoint answered but not in the expected way.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            SyncError::Rejected(_)
                | SyncError::SerializationFailed(_)
                | SyncError::DeserializationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::ConnectionFailed("refused".into()).is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::HttpStatus(503).is_retryable());

        assert!(!SyncError::HttpStatus(404).is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(!SyncError::Rejected("nope".into()).is_retryable());
    }

    #[test]
    fn test_categories() {
        assert!(SyncError::MissingIdentity.is_config_error());
        assert!(SyncError::MirrorDisabled.is_config_error());
        assert!(SyncError::Rejected("sheet missing".into()).is_protocol_error());
        assert!(!SyncError::QueueFull.is_config_error());
    }

    #[test]
    fn test_json_error_maps_to_deserialization() {
        let err: SyncError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, SyncError::DeserializationFailed(_)));
    }
}
