// src/lib.rs
//! Replay Pipeline Library
//!
//! Turns the raw interaction stream captured from a browser session into a
//! clean, deterministic event sequence that a test generator can replay.
//!
//! # Architecture
//!
//! - **recording**: event model, ingestion buffer, transform stages,
//!   processed store, query view and export
//! - **observability**: tracing subscriber and metrics recorder setup
//! - **utils**: configuration and error types
//!
//! # Example
//!
//! ```
//! use replay_pipeline::{EventPipeline, EventType, ProcessingOptions, RecordedEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> replay_pipeline::Result<()> {
//! let pipeline = EventPipeline::new(ProcessingOptions::default())?;
//! pipeline.add_event(RecordedEvent::new("e1", EventType::Click, 0, 0, "#save"));
//! pipeline.add_event(RecordedEvent::new("e2", EventType::Click, 120, 1, "#save"));
//!
//! let result = pipeline.process_all_events().await;
//! assert_eq!(result.processed_count, 1); // merged into a dblclick
//! # Ok(())
//! # }
//! ```

pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use recording::{
    EventFilters, EventPipeline, EventType, ExportFormat, ProcessingOptions, ProcessingResult,
    RecordedEvent,
};
pub use utils::config::PipelineConfig;
pub use utils::errors::{PipelineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
