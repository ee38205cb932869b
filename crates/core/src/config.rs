use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Default interval for the location poll that backs up the structural observer
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive for stderr
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingConfig,

    #[serde(default)]
    pub privacy: PrivacyLoggingConfig,
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_log_level")]
    pub level: String,
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacyLoggingConfig {
    /// `none`, `truncate` or `full`
    #[serde(default = "default_log_copied_text")]
    pub log_copied_text: String,

    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

/// `[watch]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Location poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Settings file used by the CLI in place of browser sync storage
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

fn default_log_copied_text() -> String {
    "truncate".to_string()
}

fn default_truncate_length() -> usize {
    200
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("shortcuts.json")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyLoggingConfig::default(),
        }
    }
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level() }
    }
}

impl Default for PrivacyLoggingConfig {
    fn default() -> Self {
        Self { log_copied_text: default_log_copied_text(), truncate_length: default_truncate_length() }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { poll_interval_ms: default_poll_interval_ms() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_storage_path() }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Root configuration structure for aihotkeys.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match path.exists() {
            true => Self::from_file(path),
            false => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if self.watch.poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::ZeroPollInterval.to_string()));
        }

        if crate::logging::LogFormat::parse_str(&self.logging.format).is_none() {
            return Err(Error::Config(
                ConfigError::InvalidLogFormat(self.logging.format.clone()).to_string(),
            ));
        }

        if crate::logging::TextLogging::parse_str(&self.logging.privacy.log_copied_text).is_none() {
            return Err(Error::Config(
                ConfigError::InvalidTextLogging(self.logging.privacy.log_copied_text.clone()).to_string(),
            ));
        }

        if self.storage.path.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::EmptyStoragePath.to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# AI Hotkeys configuration example
# Copy this file to aihotkeys.toml and customize as needed

[logging]
# Filter directive for stderr (overridden by AIHOTKEYS_LOG / RUST_LOG)
level = "warn"
# Output format: "pretty", "json" or "compact"
format = "pretty"

[logging.file]
# Write JSON logs to ~/.aihotkeys/logs (or AIHOTKEYS_LOG_DIR)
enabled = false
level = "debug"

[logging.privacy]
# How copied chat text shows up in logs: "none", "truncate" or "full"
log_copied_text = "truncate"
truncate_length = 200

[watch]
# Location poll interval backing up the DOM observer
poll_interval_ms = 1500

[storage]
# Settings file holding the shortcut record
path = "shortcuts.json"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Poll interval must be positive
    #[error("watch.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    /// Unknown log format
    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    /// Unknown copied-text logging mode
    #[error("invalid log_copied_text mode: {0}")]
    InvalidTextLogging(String),

    /// Storage path missing
    #[error("storage.path must not be empty")]
    EmptyStoragePath,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
