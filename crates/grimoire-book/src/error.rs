//! Error types for grimoire-book

use grimoire_core::ValidationError;
use thiserror::Error;

/// Command book error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command {0:?} already exists")]
    DuplicateCommand(String),

    #[error("command {0:?} not found")]
    UnknownCommand(String),

    #[error("command {name:?} failed validation with {} problem(s)", .errors.len())]
    Invalid {
        name: String,
        errors: Vec<ValidationError>,
    },

    #[error("store has no backing file")]
    NoBackingFile,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
