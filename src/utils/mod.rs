// src/utils/mod.rs
//! Common utilities: error types and configuration loading

pub mod config;
pub mod errors;

pub use config::PipelineConfig;
pub use errors::{PipelineError, Result};
