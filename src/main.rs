// src/main.rs
//! Replay Pipeline CLI
//!
//! Runs a captured browser recording through the processing pipeline and
//! writes the test-generation export.
//!
//! ```text
//! replay-pipeline <recording.json> [--output <path>] [--format json|pretty|yaml] [--config <path>]
//! ```

use anyhow::{bail, Context, Result};
use replay_pipeline::observability::{init_metrics, init_tracing};
use replay_pipeline::recording::{RecordedEvent, StaticFormResolver, SystemHost};
use replay_pipeline::{EventPipeline, ExportFormat, PipelineConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Input file: either a bare event array or events plus a form table
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordingFile {
    Annotated {
        events: Vec<RecordedEvent>,
        #[serde(default)]
        forms: HashMap<String, String>,
    },
    Bare(Vec<RecordedEvent>),
}

impl RecordingFile {
    fn into_parts(self) -> (Vec<RecordedEvent>, HashMap<String, String>) {
        match self {
            RecordingFile::Annotated { events, forms } => (events, forms),
            RecordingFile::Bare(events) => (events, HashMap::new()),
        }
    }
}

#[derive(Debug, Default)]
struct CliArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    config: Option<PathBuf>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = CliArgs::default();
        let mut input = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--output" | "-o" => {
                    parsed.output = Some(args.next().context("--output needs a path")?.into());
                }
                "--format" | "-f" => {
                    let format = args.next().context("--format needs a value")?;
                    parsed.format = Some(format.parse()?);
                }
                "--config" | "-c" => {
                    parsed.config = Some(args.next().context("--config needs a path")?.into());
                }
                flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
                path => input = Some(PathBuf::from(path)),
            }
        }

        parsed.input = input.context(
            "usage: replay-pipeline <recording.json> [--output <path>] [--format json|pretty|yaml] [--config <path>]",
        )?;
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1))?;

    // Load configuration
    let config = PipelineConfig::load_from(args.config.as_deref())?;

    // Initialize observability (tracing, metrics)
    init_tracing(&config.logging)?;
    let metrics = init_metrics()?;

    info!("Starting Replay Pipeline v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration loaded: {:?}", config);

    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let recording: RecordingFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let (events, forms) = recording.into_parts();
    info!("Loaded {} events ({} form fields)", events.len(), forms.len());

    let pipeline = EventPipeline::with_capabilities(
        config.processing.clone(),
        Arc::new(SystemHost::new(config.host.url.clone())),
        Arc::new(StaticFormResolver::from(forms)),
    )?;

    for event in events {
        pipeline.add_event(event);
    }
    let result = pipeline.process_all_events().await;
    for line in &result.optimizations {
        info!("{}", line);
    }

    let stats = pipeline.get_statistics();
    info!(
        "Processed {} events: {} duplicates, {} noise, {} merged, {} waits, {} grouped",
        stats.total_processed,
        stats.duplicates_removed,
        stats.noisy_events_filtered,
        stats.events_merged,
        stats.wait_events_added,
        stats.events_grouped
    );

    let format = args.format.unwrap_or(config.export.format);
    let output = pipeline.export(format)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, output)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Export written to {}", path.display());
        }
        None => println!("{}", output),
    }

    debug!("Metrics:\n{}", metrics.render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let parsed = CliArgs::parse(args(&["rec.json", "-o", "out.yaml", "--format", "yaml"])).unwrap();
        assert_eq!(parsed.input, PathBuf::from("rec.json"));
        assert_eq!(parsed.output, Some(PathBuf::from("out.yaml")));
        assert_eq!(parsed.format, Some(ExportFormat::Yaml));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(CliArgs::parse(args(&[])).is_err());
        assert!(CliArgs::parse(args(&["rec.json", "--bogus"])).is_err());
        assert!(CliArgs::parse(args(&["rec.json", "--format", "xml"])).is_err());
        assert!(CliArgs::parse(args(&["rec.json", "--output"])).is_err());
    }

    #[test]
    fn test_recording_file_shapes() {
        let bare: RecordingFile = serde_json::from_str(
            r##"[{"id":"e1","type":"click","timestamp":0,"sequence":0,"target":{"selector":"#a"}}]"##,
        )
        .unwrap();
        let (events, forms) = bare.into_parts();
        assert_eq!(events.len(), 1);
        assert!(forms.is_empty());

        let annotated: RecordingFile = serde_json::from_str(
            r##"{"events":[],"forms":{"#email":"form#signup"}}"##,
        )
        .unwrap();
        let (events, forms) = annotated.into_parts();
        assert!(events.is_empty());
        assert_eq!(forms.get("#email").map(String::as_str), Some("form#signup"));
    }
}
