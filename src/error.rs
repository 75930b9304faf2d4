//! Error types for the library
//!
//! Frame-level conditions (missing context, zero-sized surface) are never
//! errors; they skip the frame. These variants cover the fallible edges:
//! loading tuning files and naming backgrounds.

use thiserror::Error;

/// Errors raised while loading tuning or selecting a background
#[derive(Error, Debug)]
pub enum BackdropError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tuning document could not be parsed
    #[error("tuning parse error: {0}")]
    Tuning(#[from] serde_yaml::Error),

    /// A JSON document could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tuning parsed but holds values the simulators cannot use
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// No background has the given name
    #[error("unknown background kind: {0}")]
    UnknownKind(String),
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, BackdropError>;
