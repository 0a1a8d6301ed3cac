// src/observability/mod.rs
//! Logging and metrics setup
//!
//! The pipeline emits `tracing` events and `metrics` counters regardless of
//! setup; these functions only install the global subscriber and recorder.

use crate::utils::config::{LogFormat, LoggingConfig};
use crate::utils::errors::{PipelineError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr so that
/// exports written to stdout stay clean.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replay_pipeline={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Human => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| PipelineError::Observability(e.to_string()))
}

/// Install the Prometheus recorder and return a handle for rendering
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| PipelineError::Observability(e.to_string()))
}
