//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot store backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Where fetched topic payloads are read from
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Push notification delivery
    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration if the file exists.
    ///
    /// A missing file yields `None` so the caller can fall back to defaults;
    /// a file that exists but cannot be read or parsed is an error.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(AppError::validation(format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                LEVELS.join("/")
            )));
        }

        match self.storage.backend {
            StorageBackend::Local if self.storage.dir.as_os_str().is_empty() => {
                return Err(AppError::validation("storage.dir is empty"));
            }
            StorageBackend::S3 if self.storage.bucket.trim().is_empty() => {
                return Err(AppError::validation("storage.bucket is empty"));
            }
            _ => {}
        }

        if self.notifier.enabled {
            url::Url::parse(&self.notifier.api_url).map_err(|e| {
                AppError::validation(format!(
                    "notifier.api_url '{}' is invalid: {}",
                    self.notifier.api_url, e
                ))
            })?;
            if self.notifier.app_id.trim().is_empty() {
                return Err(AppError::validation("notifier.app_id is empty"));
            }
            if self.notifier.timeout_secs == 0 {
                return Err(AppError::validation("notifier.timeout_secs must be > 0"));
            }
        }
        Ok(())
    }
}

/// Snapshot store backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per topic on disk
    #[default]
    Local,
    /// In-process only, lost on exit
    Memory,
    /// One object per topic in an S3 bucket
    S3,
}

/// Snapshot store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default = "defaults::storage_dir")]
    pub dir: PathBuf,

    /// Bucket for the S3 backend
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Key prefix for the S3 backend
    #[serde(default = "defaults::prefix")]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dir: defaults::storage_dir(),
            bucket: defaults::bucket(),
            prefix: defaults::prefix(),
        }
    }
}

/// Fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory holding `{topic}.json` payloads produced by the scrapers
    #[serde(default = "defaults::input_dir")]
    pub input_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            input_dir: defaults::input_dir(),
        }
    }
}

/// Push notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Send real pushes; when false, documents are only logged
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    #[serde(default)]
    pub app_id: String,

    /// Audience segments included in every push
    #[serde(default = "defaults::segments")]
    pub segments: Vec<String>,

    /// Environment variable holding the Authorization header value
    #[serde(default = "defaults::auth_env")]
    pub auth_env: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: defaults::api_url(),
            app_id: String::new(),
            segments: defaults::segments(),
            auth_env: defaults::auth_env(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Storage defaults
    pub fn storage_dir() -> PathBuf {
        PathBuf::from("storage")
    }
    pub fn bucket() -> String {
        "schedule-updater".into()
    }
    pub fn prefix() -> String {
        "snapshots".into()
    }

    // Fetch defaults
    pub fn input_dir() -> PathBuf {
        PathBuf::from("data")
    }

    // Notifier defaults
    pub fn api_url() -> String {
        "https://onesignal.com/api/v1/notifications".into()
    }
    pub fn segments() -> Vec<String> {
        vec!["Active Users".into(), "Inactive Users".into()]
    }
    pub fn auth_env() -> String {
        "ONESIGNAL_AUTH".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "schedule-updater/0.1".into()
    }

    pub fn level() -> String {
        "info".into()
    }
}
