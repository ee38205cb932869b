//! Logging and observability.
//!
//! Everything logs through `tracing`. On native targets [`init_logging`] installs a
//! `tracing-subscriber` registry; the browser build installs its own console writer.
//!
//! # Environment Variables
//!
//! - `AIHOTKEYS_LOG`: Filter directive (like `RUST_LOG`), e.g., `aihotkeys_actions=debug`
//! - `AIHOTKEYS_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `AIHOTKEYS_LOG_DIR`: Directory for file logs (default `~/.aihotkeys/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//!
//! [logging.privacy]
//! log_copied_text = "truncate"
//! truncate_length = 200
//! ```

use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};
use std::str::FromStr;

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    /// Get the string representation of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// How copied chat text appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLogging {
    /// Don't log copied text.
    #[default]
    None,
    /// Log truncated text (up to `truncate_length` chars).
    Truncate,
    /// Log full text (may include private conversations).
    Full,
}

impl TextLogging {
    /// Parse from string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(TextLogging::None),
            "truncate" => Some(TextLogging::Truncate),
            "full" => Some(TextLogging::Full),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextLogging::None => "none",
            TextLogging::Truncate => "truncate",
            TextLogging::Full => "full",
        }
    }
}

impl FromStr for TextLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextLogging::parse_str(s).ok_or_else(|| format!("invalid text logging mode: {}", s))
    }
}

/// Logging configuration wrapper that bridges config and logging modules.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// File logging configuration (optional).
    pub file: Option<FileLoggingConfig>,
    /// Privacy controls for copied text.
    pub privacy: PrivacyConfig,
}

/// Privacy configuration for copied chat text in logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyConfig {
    /// How to handle copied text in logs.
    pub log_copied_text: TextLogging,
    /// Maximum length for truncated content.
    pub truncate_length: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file: None, privacy: PrivacyConfig::default() }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_copied_text = TextLogging::parse_str(&config.privacy.log_copied_text).unwrap_or_default();

        Self {
            level: config.level,
            format,
            file: if config.file.enabled { Some(config.file) } else { None },
            privacy: PrivacyConfig { log_copied_text, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set privacy configuration.
    pub fn with_privacy(mut self, config: PrivacyConfig) -> Self {
        self.privacy = config;
        self
    }
}

/// Redact copied text based on privacy settings.
pub fn redact_sensitive(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_copied_text {
        TextLogging::None => "[REDACTED]".to_string(),
        TextLogging::Full => content.to_string(),
        TextLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
    }
}

#[cfg(feature = "native")]
pub use native::init_logging;

#[cfg(feature = "native")]
mod native {
    use super::{LogFormat, LoggingConfig};
    use crate::Error;

    use std::env;
    use std::io;
    use std::path::PathBuf;
    use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    impl LoggingConfig {
        /// Build an EnvFilter from this config and environment variables.
        fn build_env_filter(&self) -> EnvFilter {
            let filter = env::var("AIHOTKEYS_LOG")
                .ok()
                .or_else(|| env::var("RUST_LOG").ok())
                .unwrap_or_else(|| self.level.clone());

            EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(&self.level))
        }

        /// Detect if stderr is a TTY for pretty formatting.
        fn is_tty() -> bool {
            atty::is(atty::Stream::Stderr)
        }

        /// Determine the appropriate format for stderr output.
        fn detect_format(&self) -> LogFormat {
            if let Ok(fmt_str) = env::var("AIHOTKEYS_LOG_FORMAT")
                && let Some(fmt) = LogFormat::parse_str(&fmt_str)
            {
                return fmt;
            }

            match (self.format, Self::is_tty()) {
                (LogFormat::Pretty, false) => LogFormat::Compact,
                (format, _) => format,
            }
        }

        /// Get the log directory path.
        fn get_log_dir() -> Result<PathBuf, Error> {
            if let Ok(custom_dir) = env::var("AIHOTKEYS_LOG_DIR") {
                return Ok(PathBuf::from(custom_dir));
            }

            let home = env::var("HOME")
                .or_else(|_| env::var("USERPROFILE"))
                .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

            Ok(PathBuf::from(home).join(".aihotkeys").join("logs"))
        }
    }

    /// Initialize the tracing subscriber with the given configuration.
    ///
    /// Sets up:
    /// - Environment-based filter (from `AIHOTKEYS_LOG` or `RUST_LOG`)
    /// - Formatted stderr output (pretty, json, or compact)
    /// - Optional daily-rolling JSON file output
    ///
    /// The returned guard must be held for as long as file logs should be flushed.
    pub fn init_logging(
        config: Option<LoggingConfig>,
    ) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Error> {
        let config = config.unwrap_or_default();
        let env_filter = config.build_env_filter();
        let format = config.detect_format();

        let registry = Registry::default().with(env_filter);

        if config.file.is_some() {
            let log_dir = LoggingConfig::get_log_dir()?;
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

            let file_appender = tracing_appender::rolling::daily(log_dir, "aihotkeys.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let result = match format {
                LogFormat::Pretty => registry
                    .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                    .with(fmt::layer().json().with_writer(non_blocking))
                    .try_init(),
                LogFormat::Json => registry
                    .with(fmt::layer().json().with_writer(io::stderr))
                    .with(fmt::layer().json().with_writer(non_blocking))
                    .try_init(),
                LogFormat::Compact => registry
                    .with(fmt::layer().compact().with_writer(io::stderr))
                    .with(fmt::layer().json().with_writer(non_blocking))
                    .try_init(),
            };
            result.map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;
            return Ok(Some(guard));
        }

        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .try_init(),
            LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(io::stderr)).try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;

        Ok(None)
    }
}
