// src/utils/config.rs
//! Pipeline configuration
//!
//! Loaded from an optional file (`replay-pipeline.toml`, `.yaml` or `.json` in
//! the working directory, or an explicit path) layered under environment
//! overrides of the form `REPLAY_PIPELINE__PROCESSING__BATCH_SIZE=100`.

use crate::recording::exporter::ExportFormat;
use crate::recording::pipeline::ProcessingOptions;
use crate::utils::errors::{PipelineError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Base name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "replay-pipeline";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "REPLAY_PIPELINE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub processing: ProcessingOptions,
    pub logging: LoggingConfig,
    pub host: HostConfig,
    pub export: ExportConfig,
}

impl PipelineConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path` (or the default location) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::build(path, ENV_PREFIX)
    }

    fn build(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: PipelineConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.processing.validate()?;

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(PipelineError::Config(format!(
                "Unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Page URL stamped on synthetic events
    pub url: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.processing, ProcessingOptions::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.host.url, "about:blank");
        assert_eq!(config.export.format, ExportFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_file() {
        let (_dir, path) = write_config(
            "pipeline.toml",
            r#"
            [processing]
            batch_size = 10
            add_smart_waits = false

            [logging]
            level = "debug"
            format = "json"

            [export]
            format = "yaml"
            "#,
        );

        let config = PipelineConfig::build(Some(&path), "REPLAY_PIPELINE_TEST_TOML").unwrap();
        assert_eq!(config.processing.batch_size, 10);
        assert!(!config.processing.add_smart_waits);
        assert!(config.processing.deduplicate);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.export.format, ExportFormat::Yaml);
    }

    #[test]
    fn test_invalid_batch_size_rejected() {
        let (_dir, path) = write_config("pipeline.toml", "[processing]\nbatch_size = 0\n");

        let err = PipelineConfig::build(Some(&path), "REPLAY_PIPELINE_TEST_ZERO").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOptions(_)));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let (_dir, path) = write_config("pipeline.yaml", "logging:\n  level: loud\n");

        let err = PipelineConfig::build(Some(&path), "REPLAY_PIPELINE_TEST_LEVEL").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("REPLAY_PIPELINE_TEST_ENV__PROCESSING__MAX_BUFFER_SIZE", "25");
        std::env::set_var("REPLAY_PIPELINE_TEST_ENV__HOST__URL", "https://example.test/");

        let config = PipelineConfig::build(None, "REPLAY_PIPELINE_TEST_ENV").unwrap();
        assert_eq!(config.processing.max_buffer_size, 25);
        assert_eq!(config.host.url, "https://example.test/");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = PipelineConfig::load_from(Some(Path::new("/nonexistent/pipeline.toml")));
        assert!(err.is_err());
    }
}
