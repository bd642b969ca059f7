//! Runtime error types.

use thiserror::Error;

/// Errors from configuration and session bootstrap.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing capability '{capability}': {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
