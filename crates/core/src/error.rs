use thiserror::Error;

/// Result type alias for aihotkeys-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the hotkey router
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Persisted settings could not be read or written
    #[error("storage error: {0}")]
    Storage(String),

    /// File watcher errors
    #[error("watcher error: {0}")]
    Watcher(String),

    /// Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
