//! # Cashbook Configuration
//!
//! Configuration for the acting identity, the spreadsheet mirror and local
//! storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (applied by the CLI, highest priority)          │
//! │     --user asha  --db ./cash.db                                        │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     CASHBOOK_USER=asha                                                 │
//! │     CASHBOOK_MIRROR_URL=https://script.example.com/exec                │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/ledger/cashbook.toml (Linux)                             │
//! │     ~/Library/Application Support/com.cashbook.ledger/cashbook.toml    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     mirror disabled, reset_policy = "both"                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [user]
//! identity = "asha"
//!
//! [mirror]
//! enabled = true
//! endpoint = "https://script.example.com/macros/s/abc/exec"
//! timeout_secs = 30
//! queue_capacity = 256
//! error_reset_ms = 3000
//!
//! [storage]
//! reset_policy = "both"  # both | independent
//! ```

use cashbook_core::validation::validate_identity;
use cashbook_core::ResetPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

/// File name of the config file inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "cashbook.toml";

/// File name of the SQLite database inside the platform data dir.
pub const DATABASE_FILE_NAME: &str = "cashbook.db";

// =============================================================================
// User Configuration
// =============================================================================

/// Who is operating the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Identity recorded on new transactions and used to scope the visible
    /// list.
    #[serde(default)]
    pub identity: Option<String>,
}

// =============================================================================
// Mirror Settings
// =============================================================================

/// Spreadsheet mirror settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSettings {
    #[serde(default)]
    pub enabled: bool,

    /// URL of the hosted spreadsheet script.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// HTTP request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Jobs held before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Delay before an `error` status falls back to `idle` (milliseconds).
    #[serde(default = "default_error_reset")]
    pub error_reset_ms: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_queue_capacity() -> usize {
    crate::queue::DEFAULT_QUEUE_CAPACITY
}

fn default_error_reset() -> u64 {
    3000
}

impl Default for MirrorSettings {
    fn default() -> Self {
        MirrorSettings {
            enabled: false,
            endpoint: None,
            timeout_secs: default_timeout(),
            queue_capacity: default_queue_capacity(),
            error_reset_ms: default_error_reset(),
        }
    }
}

impl MirrorSettings {
    /// Endpoint to use, if the mirror is switched on and has one.
    pub fn active_endpoint(&self) -> Option<&str> {
        if self.enabled {
            self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
        } else {
            None
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// What to clear when a persisted blob is unreadable.
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cashbook configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashbookConfig {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub mirror: MirrorSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl CashbookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cashbook.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file, creating the parent directory.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    ///
    /// A missing identity is not an error here; commands that record or
    /// scope transactions ask for it through [`CashbookConfig::identity`].
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(identity) = &self.user.identity {
            validate_identity(identity)
                .map_err(|e| SyncError::InvalidConfig(format!("user.identity: {}", e)))?;
        }

        if let Some(endpoint) = &self.mirror.endpoint {
            let url = Url::parse(endpoint)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(SyncError::InvalidUrl(format!(
                    "Mirror URL must start with http:// or https://, got: {}",
                    endpoint
                )));
            }
        }

        if self.mirror.enabled && self.mirror.active_endpoint().is_none() {
            return Err(SyncError::InvalidConfig(
                "mirror.enabled is set but mirror.endpoint is empty".into(),
            ));
        }

        if self.mirror.queue_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "queue_capacity must be greater than 0".into(),
            ));
        }

        if self.mirror.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `CASHBOOK_*` overrides read through `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup("CASHBOOK_USER") {
            debug!(user = %user, "Overriding identity from environment");
            self.user.identity = Some(user);
        }

        if let Some(url) = lookup("CASHBOOK_MIRROR_URL") {
            debug!(url = %url, "Overriding mirror URL from environment");
            self.mirror.endpoint = Some(url);
            self.mirror.enabled = true;
        }

        if let Some(enabled) = lookup("CASHBOOK_MIRROR_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.mirror.enabled = true,
                "0" | "false" | "no" | "off" => self.mirror.enabled = false,
                _ => warn!(value = %enabled, "Unknown CASHBOOK_MIRROR_ENABLED value"),
            }
        }

        if let Some(policy) = lookup("CASHBOOK_RESET_POLICY") {
            match policy.parse::<ResetPolicy>() {
                Ok(parsed) => self.storage.reset_policy = parsed,
                Err(_) => warn!(policy = %policy, "Unknown reset policy in environment"),
            }
        }

        if let Some(path) = lookup("CASHBOOK_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Returns the default database path.
    pub fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "cashbook", "ledger")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Acting identity, trimmed. Errors when none is configured.
    pub fn identity(&self) -> SyncResult<String> {
        let raw = self.user.identity.as_deref().ok_or(SyncError::MissingIdentity)?;
        validate_identity(raw).map_err(|_| SyncError::MissingIdentity)
    }

    /// Database file to open: configured path, else the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage
            .database_path
            .clone()
            .or_else(Self::default_database_path)
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.storage.reset_policy
    }

    pub fn mirror_timeout(&self) -> Duration {
        Duration::from_secs(self.mirror.timeout_secs)
    }

    pub fn error_reset(&self) -> Duration {
        Duration::from_millis(self.mirror.error_reset_ms)
    }

    /// Queue settings derived from `[mirror]`.
    pub fn queue_config(&self) -> crate::queue::QueueConfig {
        crate::queue::QueueConfig {
            capacity: self.mirror.queue_capacity,
            error_reset: self.error_reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CashbookConfig::default();
        assert!(config.user.identity.is_none());
        assert!(!config.mirror.enabled);
        assert_eq!(config.mirror.timeout_secs, 30);
        assert_eq!(config.mirror.queue_capacity, 256);
        assert_eq!(config.error_reset(), Duration::from_millis(3000));
        assert_eq!(config.reset_policy(), ResetPolicy::Both);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CashbookConfig::default();

        config.mirror.endpoint = Some("ftp://example.com".into());
        assert!(config.validate().is_err());

        config.mirror.endpoint = Some("not a url".into());
        assert!(config.validate().is_err());

        config.mirror.endpoint = Some("https://script.example.com/exec".into());
        config.mirror.enabled = true;
        assert!(config.validate().is_ok());

        config.mirror.endpoint = None;
        assert!(config.validate().is_err());

        config = CashbookConfig::default();
        config.user.identity = Some("   ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identity() {
        let mut config = CashbookConfig::default();
        assert!(matches!(config.identity(), Err(SyncError::MissingIdentity)));

        config.user.identity = Some("  asha ".into());
        assert_eq!(config.identity().unwrap(), "asha");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CashbookConfig::default();
        config.apply_overrides_from(env(&[
            ("CASHBOOK_USER", "ravi"),
            ("CASHBOOK_MIRROR_URL", "https://script.example.com/exec"),
            ("CASHBOOK_RESET_POLICY", "independent"),
            ("CASHBOOK_DB_PATH", "/tmp/cash.db"),
        ]));

        assert_eq!(config.user.identity.as_deref(), Some("ravi"));
        assert_eq!(
            config.mirror.active_endpoint(),
            Some("https://script.example.com/exec")
        );
        assert_eq!(config.reset_policy(), ResetPolicy::Independent);
        assert_eq!(config.database_path(), Some(PathBuf::from("/tmp/cash.db")));

        config.apply_overrides_from(env(&[
            ("CASHBOOK_MIRROR_ENABLED", "off"),
            ("CASHBOOK_RESET_POLICY", "sometimes"),
        ]));
        assert!(config.mirror.active_endpoint().is_none());
        assert_eq!(config.reset_policy(), ResetPolicy::Independent);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CashbookConfig::default();
        config.user.identity = Some("asha".into());
        config.mirror.enabled = true;
        config.mirror.endpoint = Some("https://script.example.com/exec".into());
        config.storage.reset_policy = ResetPolicy::Independent;

        let written = config.save(Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[mirror]"));
        assert!(contents.contains("reset_policy = \"independent\""));

        let loaded: CashbookConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CashbookConfig = toml::from_str(
            r#"
            [mirror]
            endpoint = "https://script.example.com/exec"
            "#,
        )
        .unwrap();

        assert!(!config.mirror.enabled);
        assert_eq!(config.mirror.timeout_secs, 30);
        assert_eq!(config.storage.reset_policy, ResetPolicy::Both);
    }

    #[test]
    fn test_load_rejects_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[mirror\nenabled = ").unwrap();

        assert!(matches!(
            CashbookConfig::load(Some(path)),
            Err(SyncError::ConfigLoadFailed(_))
        ));
    }
}
