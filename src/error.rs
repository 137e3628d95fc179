//! Unified error handling
//!
//! Each concern owns its error type next to its code; `LuyError` unifies
//! them for callers that drive a whole session load.

use crate::config::ConfigError;
use crate::datamodel::DataParseError;
use crate::metamodel::SchemaParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LuyError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaParseError),

    #[error("Data error: {0}")]
    Data(#[from] DataParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A background worker died before producing its result.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for LuyError {
    fn from(error: tokio::task::JoinError) -> Self {
        LuyError::Task(error.to_string())
    }
}

pub type LuyResult<T> = Result<T, LuyError>;
