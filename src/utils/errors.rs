// src/utils/errors.rs
//! Error types
//!
//! The processing core itself never fails: capacity, not-found, concurrency
//! and form-resolution conditions all degrade to no-ops. These errors cover
//! the surrounding layer (configuration, option validation, export rendering,
//! logging setup).

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid processing options: {0}")]
    InvalidOptions(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Observability setup failed: {0}")]
    Observability(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
