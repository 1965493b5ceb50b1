//! # Client Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     EXPO_PUBLIC_API_BASE_URL (or EXPO_PUBLIC_API_URL)                  │
//! │     REWARDCART_DB_PATH                                                 │
//! │     REWARDCART_SYNC_MAX_ATTEMPTS                                       │
//! │     REWARDCART_SEARCH_DEBOUNCE_MS                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rewardcart/config.toml (Linux)                           │
//! │     ~/Library/Application Support/app.rewardcart.rewardcart/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://api.example.com"
//! request_timeout_secs = 15
//!
//! [sync]
//! auto_sync = true
//! max_attempts = 3
//! batch_size = 50
//! probe_interval_secs = 30
//!
//! [search]
//! debounce_ms = 300
//! min_query_len = 2
//! result_limit = 20
//!
//! [storage]
//! database_path = "/var/lib/rewardcart/rewardcart.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

pub const ENV_API_BASE_URL: &str = "EXPO_PUBLIC_API_BASE_URL";
pub const ENV_API_URL_FALLBACK: &str = "EXPO_PUBLIC_API_URL";
pub const ENV_DB_PATH: &str = "REWARDCART_DB_PATH";
pub const ENV_SYNC_MAX_ATTEMPTS: &str = "REWARDCART_SYNC_MAX_ATTEMPTS";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "REWARDCART_SEARCH_DEBOUNCE_MS";

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend base URL; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Sync automatically when connectivity returns.
    #[serde(default = "default_true")]
    pub auto_sync: bool,

    /// Delivery attempts before a queued operation is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Queue entries read per database round-trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Interval between backend health probes (seconds). 0 disables probing.
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    3
}
fn default_batch_size() -> u32 {
    50
}
fn default_probe_interval() -> u64 {
    30
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            auto_sync: true,
            max_attempts: default_max_attempts(),
            batch_size: default_batch_size(),
            probe_interval_secs: default_probe_interval(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before searching.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shorter queries clear results without a request.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

fn default_debounce_ms() -> u64 {
    300
}
fn default_min_query_len() -> usize {
    2
}
fn default_result_limit() -> u32 {
    20
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            result_limit: default_result_limit(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file for the offline queue. Defaults to the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else the platform default)
    /// 3. Environment variables
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            }
            None => {
                if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
                    info!(?path, "Loading config from file");
                    config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
                } else {
                    debug!("No config file found, using defaults");
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> SyncResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.sync.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if self.sync.max_attempts == 0 {
            return Err(SyncError::InvalidConfig(
                "max_attempts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a variable lookup (the process environment
    /// in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_BASE_URL).or_else(|| non_empty(ENV_API_URL_FALLBACK)) {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = non_empty(ENV_DB_PATH) {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = non_empty(ENV_SYNC_MAX_ATTEMPTS) {
            match raw.parse::<u32>() {
                Ok(n) => self.sync.max_attempts = n,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_SYNC_MAX_ATTEMPTS),
            }
        }

        if let Some(raw) = non_empty(ENV_SEARCH_DEBOUNCE_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.search.debounce_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_SEARCH_DEBOUNCE_MS),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("app", "rewardcart", "rewardcart")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database path: configured, else platform data dir, else cwd.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("rewardcart.db")))
            .unwrap_or_else(|| PathBuf::from("rewardcart.db"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// `None` when probing is disabled.
    pub fn probe_interval(&self) -> Option<Duration> {
        (self.sync.probe_interval_secs > 0).then(|| Duration::from_secs(self.sync.probe_interval_secs))
    }
}
