// src/recording/exporter.rs
//! Export processed recordings for test generation
//!
//! Supports:
//! - JSON (compact, for persistence and IPC)
//! - Pretty JSON (for review and diffs)
//! - YAML (for hand-edited fixtures)

use crate::recording::event::{EventGroup, RecordedEvent, TimelineMarker};
use crate::recording::pipeline::ProcessingOptions;
use crate::recording::store::EventStatistics;
use crate::utils::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Compact JSON
    Json,

    /// Indented JSON
    #[default]
    Pretty,

    /// YAML
    Yaml,
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "pretty" => Ok(ExportFormat::Pretty),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(PipelineError::ExportFailed(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

/// Snapshot handed to the code generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestGenerationExport {
    pub events: Vec<RecordedEvent>,
    pub groups: Vec<EventGroup>,
    pub timeline: Vec<TimelineMarker>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// RFC 3339 export time
    pub exported_at: String,
    pub generator: String,
    pub version: String,
    /// Session ids seen in the events, in first-seen order
    pub session_ids: Vec<String>,
    pub total_events: usize,
    pub total_groups: usize,
    /// Capture time span of the exported events, in milliseconds
    pub duration_ms: u64,
    pub statistics: EventStatistics,
    pub options: ProcessingOptions,
}

impl TestGenerationExport {
    pub fn new(
        events: Vec<RecordedEvent>,
        groups: Vec<EventGroup>,
        timeline: Vec<TimelineMarker>,
        statistics: EventStatistics,
        options: ProcessingOptions,
        exported_at_ms: u64,
    ) -> Self {
        let mut session_ids: Vec<String> = Vec::new();
        for event in &events {
            let session = &event.metadata.session_id;
            if !session.is_empty() && !session_ids.contains(session) {
                session_ids.push(session.clone());
            }
        }

        let duration_ms = match (events.first(), events.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => 0,
        };

        let metadata = ExportMetadata {
            exported_at: format_timestamp(exported_at_ms),
            generator: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            session_ids,
            total_events: events.len(),
            total_groups: groups.len(),
            duration_ms,
            statistics,
            options,
        };

        Self {
            events,
            groups,
            timeline,
            metadata,
        }
    }
}

/// Renders export snapshots
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export a snapshot to string
    pub fn export(&self, snapshot: &TestGenerationExport) -> Result<String> {
        debug!(
            "Exporting {} events to {:?} format",
            snapshot.events.len(),
            self.format
        );

        match self.format {
            ExportFormat::Json => serde_json::to_string(snapshot).map_err(|e| {
                PipelineError::ExportFailed(format!("JSON serialization error: {}", e))
            }),
            ExportFormat::Pretty => serde_json::to_string_pretty(snapshot).map_err(|e| {
                PipelineError::ExportFailed(format!("JSON serialization error: {}", e))
            }),
            ExportFormat::Yaml => serde_yaml::to_string(snapshot).map_err(|e| {
                PipelineError::ExportFailed(format!("YAML serialization error: {}", e))
            }),
        }
    }

    /// Parse a previously exported JSON snapshot
    pub fn import_json(data: &str) -> Result<TestGenerationExport> {
        serde_json::from_str(data).map_err(PipelineError::from)
    }
}

fn format_timestamp(timestamp_ms: u64) -> String {
    use chrono::{DateTime, Utc};
    let dt = DateTime::<Utc>::from_timestamp_millis(timestamp_ms as i64).unwrap_or_default();
    dt.to_rfc3339()
}
