pub mod action;
pub mod config;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod settings;
pub mod shortcut;

pub use action::{ActionId, ActionMetadata};
pub use config::{Config, DEFAULT_POLL_INTERVAL_MS, LoggingConfig, StorageConfig, WatchConfig};
pub use error::{Error, Result};
pub use keymap::{
    KeymapError, KeymapErrorKind, KeymapParse, format_shortcut, merge_assignments, parse_combo, parse_keymap,
    serialize_keymap,
};
pub use logging::{LogFormat, PrivacyConfig, TextLogging, redact_sensitive};
#[cfg(feature = "native")]
pub use logging::init_logging;
pub use settings::{STORAGE_KEY, SettingsChange, extract_record, settings_record};
#[cfg(feature = "native")]
pub use settings::{FileSettingsStore, SettingsWatcher};
pub use shortcut::{
    BuildReport, Conflict, RejectReason, Rejection, Shortcut, ShortcutMap, blocked_reason, blocked_shortcuts,
    default_shortcut, is_blocked, normalize_key,
};
