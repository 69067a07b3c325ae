//! Error types for grimoire-core

use crate::sink::SinkError;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("interaction chain exceeded the maximum depth of {limit}")]
    RecursionLimitExceeded { limit: u32 },

    #[error("unsupported action type in stored definition")]
    UnsupportedAction,

    #[error("unsupported condition type in stored definition")]
    UnsupportedCondition,

    #[error("action is missing required field {0:?}")]
    MissingField(&'static str),

    #[error("effect sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
