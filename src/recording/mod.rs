// src/recording/mod.rs
//! Recorded-event processing
//!
//! This module turns the raw interaction stream from a browser recording into
//! a clean event sequence for test generation:
//!
//! - **Event**: `RecordedEvent` and its target, payload, context and metadata
//! - **Event Queue**: bounded ingestion buffer with oldest-first eviction
//! - **Stages**: dedup, noise filter, merger, smart waits, form grouping
//! - **Store**: processed events, groups, timeline markers, statistics
//! - **Query**: read-only filtering and sorting
//! - **Exporter**: snapshot for code generators (JSON, YAML)
//! - **Host**: injected clock, page context and form resolver
//!
//! # Architecture
//!
//! ```text
//! Capture → add_event() → Event Queue ──(batch_size reached)──┐
//!                              │                               │
//!                    process_all_events()                      │
//!                              ↓                               ↓
//!             Dedup → Noise → Merge → Smart waits → Group forms
//!                                                    ↓
//!                                            Processed Store
//!                                             ↓           ↓
//!                                          Query       Exporter
//! ```

pub mod event;
pub mod event_queue;
pub mod exporter;
pub mod host;
pub mod pipeline;
pub mod query;
pub mod stages;
pub mod store;

// Re-export commonly used types
pub use event::{
    AnnotationKind, EventAnnotation, EventData, EventGroup, EventTarget, EventType, MarkerKind,
    RecordedEvent, TimelineMarker,
};
pub use event_queue::{EventQueue, QueueStats};
pub use exporter::{ExportFormat, Exporter, TestGenerationExport};
pub use host::{FixedHost, FormResolver, Host, NullFormResolver, StaticFormResolver, SystemHost};
pub use pipeline::{EventPipeline, ProcessingOptions, ProcessingResult};
pub use query::{EventFilters, SortKey};
pub use store::EventStatistics;
