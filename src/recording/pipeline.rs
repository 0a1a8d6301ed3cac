// src/recording/pipeline.rs
//! Recorded-event processing pipeline
//!
//! Owns the ingestion buffer and the processed store. Events are buffered as
//! they arrive and transformed in batches, either automatically once
//! `batch_size` events are waiting or on demand via
//! [`EventPipeline::process_all_events`].
//!
//! All methods take `&self` so one pipeline can be shared between callbacks on
//! the same event loop. A single "processing" flag keeps batch runs from
//! overlapping; a caller that finds a run in flight gets an empty
//! [`ProcessingResult`] and should simply try again later.

use crate::recording::event::{EventAnnotation, EventGroup, RecordedEvent, TimelineMarker};
use crate::recording::event_queue::{EventQueue, QueueStats};
use crate::recording::exporter::{ExportFormat, Exporter, TestGenerationExport};
use crate::recording::host::{FormResolver, Host, NullFormResolver, SystemHost};
use crate::recording::query::EventFilters;
use crate::recording::stages::{self, BatchOutcome, StageContext};
use crate::recording::store::{EventStatistics, ProcessedStore};
use crate::utils::errors::{PipelineError, Result};
use metrics::{counter, gauge};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub deduplicate: bool,
    pub merge_consecutive: bool,
    pub filter_noise: bool,
    pub group_related: bool,

    /// Reserved for the capture layer's selector optimizer; not used here
    pub optimize_selectors: bool,

    pub add_smart_waits: bool,

    /// Maximum number of buffered, unprocessed events
    pub max_buffer_size: usize,

    /// Buffered events that trigger an automatic batch run
    pub batch_size: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            deduplicate: true,
            merge_consecutive: true,
            filter_noise: true,
            group_related: true,
            optimize_selectors: true,
            add_smart_waits: true,
            max_buffer_size: 1000,
            batch_size: 50,
        }
    }
}

impl ProcessingOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer_size == 0 {
            return Err(PipelineError::InvalidOptions(
                "max_buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidOptions(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if !self.auto_batching_enabled() {
            warn!(
                batch_size = self.batch_size,
                max_buffer_size = self.max_buffer_size,
                "batch_size exceeds max_buffer_size, events only process on process_all_events"
            );
        }
        Ok(())
    }

    /// Whether the buffer can ever hold a full batch
    pub fn auto_batching_enabled(&self) -> bool {
        self.batch_size <= self.max_buffer_size
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub original_count: usize,
    pub processed_count: usize,
    pub removed_count: usize,
    pub groups_created: usize,
    pub optimizations: Vec<String>,
}

impl ProcessingResult {
    fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            original_count: outcome.original_count,
            processed_count: outcome.events.len(),
            removed_count: outcome.stats.removed(),
            groups_created: outcome.groups.len(),
            optimizations: outcome.stats.optimizations(outcome.groups.len()),
        }
    }

    /// True when the run changed nothing (or did not run at all)
    pub fn is_empty(&self) -> bool {
        self.original_count == 0 && self.processed_count == 0
    }
}

struct PipelineState {
    queue: EventQueue,
    store: ProcessedStore,
    /// Bumped by `clear`; a batch drained under an older generation is discarded
    generation: u64,
}

/// Releases the processing flag when a run ends
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Buffered, batch-transforming event pipeline
pub struct EventPipeline {
    options: RwLock<ProcessingOptions>,
    state: Mutex<PipelineState>,
    processing: AtomicBool,
    host: Arc<dyn Host>,
    resolver: Arc<dyn FormResolver>,
}

impl EventPipeline {
    /// Create a pipeline on the wall clock with no form resolution
    pub fn new(options: ProcessingOptions) -> Result<Self> {
        Self::with_capabilities(
            options,
            Arc::new(SystemHost::default()),
            Arc::new(NullFormResolver),
        )
    }

    /// Create a pipeline with explicit host and form resolver
    pub fn with_capabilities(
        options: ProcessingOptions,
        host: Arc<dyn Host>,
        resolver: Arc<dyn FormResolver>,
    ) -> Result<Self> {
        options.validate()?;
        info!(
            max_buffer_size = options.max_buffer_size,
            batch_size = options.batch_size,
            "Initializing event pipeline"
        );

        Ok(Self {
            state: Mutex::new(PipelineState {
                queue: EventQueue::new(options.max_buffer_size),
                store: ProcessedStore::new(),
                generation: 0,
            }),
            options: RwLock::new(options),
            processing: AtomicBool::new(false),
            host,
            resolver,
        })
    }

    /// Buffer an event, running a batch once enough events are waiting
    pub fn add_event(&self, event: RecordedEvent) {
        let batch_size = self.options.read().batch_size;
        counter!("replay_pipeline_events_ingested_total").increment(1);

        let ready = {
            let mut state = self.state.lock();
            if let Some(evicted) = state.queue.push(event) {
                debug!(event_id = %evicted.id, "Buffer full, evicted oldest event");
                counter!("replay_pipeline_events_evicted_total").increment(1);
            }
            gauge!("replay_pipeline_buffer_len").set(state.queue.len() as f64);
            state.queue.len() >= batch_size
        };

        if ready {
            match ProcessingGuard::acquire(&self.processing) {
                Some(_guard) => {
                    let (batch, generation) = {
                        let mut state = self.state.lock();
                        (state.queue.drain_batch(batch_size), state.generation)
                    };
                    self.run_batch(batch, generation);
                }
                None => debug!("Batch threshold reached while processing, deferring"),
            }
        }
    }

    /// Transform every buffered event
    ///
    /// Returns an empty result without touching any state if another run is
    /// already in progress.
    pub async fn process_all_events(&self) -> ProcessingResult {
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            debug!("Processing already in progress, skipping");
            return ProcessingResult::default();
        };

        let (batch, generation) = {
            let mut state = self.state.lock();
            (state.queue.drain_all(), state.generation)
        };

        // Let other tasks on this event loop run; they will see the flag set.
        tokio::task::yield_now().await;

        self.run_batch(batch, generation)
    }

    fn run_batch(&self, mut batch: Vec<RecordedEvent>, generation: u64) -> ProcessingResult {
        if batch.is_empty() {
            return ProcessingResult::default();
        }

        let started = Instant::now();
        let options = self.options.read().clone();
        let original_count = batch.len();

        // Ids must stay unique across the store's lifetime
        let (id_collisions, next_group_number) = {
            let state = self.state.lock();
            let mut seen = HashSet::with_capacity(batch.len());
            batch.retain(|e| !state.store.contains(&e.id) && seen.insert(e.id.clone()));
            (original_count - batch.len(), state.store.group_count() + 1)
        };

        let ctx = StageContext {
            host: self.host.as_ref(),
            resolver: self.resolver.as_ref(),
            next_group_number,
        };
        let mut outcome = stages::transform_batch(batch, &options, &ctx);
        outcome.original_count = original_count;
        outcome.stats.duplicates_removed += id_collisions;

        let result = ProcessingResult::from_outcome(&outcome);

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    discarded = outcome.events.len(),
                    "Pipeline cleared during batch, discarding results"
                );
                return ProcessingResult::default();
            }
            record_metrics(&outcome);
            state.store.commit(outcome);
            gauge!("replay_pipeline_buffer_len").set(state.queue.len() as f64);
        }

        debug!(
            original = result.original_count,
            processed = result.processed_count,
            removed = result.removed_count,
            groups = result.groups_created,
            elapsed = ?started.elapsed(),
            "Batch processed"
        );

        result
    }

    /// Snapshot of processed events, optionally filtered and sorted
    pub fn get_processed_events(&self, filters: Option<&EventFilters>) -> Vec<RecordedEvent> {
        let state = self.state.lock();
        match filters {
            Some(filters) => filters.apply(state.store.events(), state.store.groups()),
            None => state.store.events().to_vec(),
        }
    }

    pub fn get_event(&self, event_id: &str) -> Option<RecordedEvent> {
        self.state.lock().store.event(event_id).cloned()
    }

    /// Group existing events manually; returns the new group id
    pub fn create_event_group(
        &self,
        event_ids: &[String],
        name: impl Into<String>,
        description: Option<String>,
    ) -> String {
        let id = self
            .state
            .lock()
            .store
            .create_group(event_ids, name, description);
        debug!(group_id = %id, members = event_ids.len(), "Created event group");
        id
    }

    pub fn get_event_groups(&self) -> Vec<EventGroup> {
        self.state.lock().store.groups().to_vec()
    }

    pub fn get_event_group(&self, group_id: &str) -> Option<EventGroup> {
        self.state.lock().store.group(group_id).cloned()
    }

    /// Returns false if the group is unknown
    pub fn set_group_collapsed(&self, group_id: &str, collapsed: bool) -> bool {
        self.state
            .lock()
            .store
            .set_group_collapsed(group_id, collapsed)
    }

    pub fn add_timeline_marker(&self, marker: TimelineMarker) -> String {
        self.state.lock().store.add_marker(marker)
    }

    pub fn get_timeline_markers(&self) -> Vec<TimelineMarker> {
        self.state.lock().store.markers().to_vec()
    }

    /// Attach an annotation; a no-op returning false if the event is unknown
    pub fn add_event_annotation(&self, event_id: &str, annotation: EventAnnotation) -> bool {
        let added = self.state.lock().store.annotate(event_id, annotation);
        if !added {
            debug!(event_id = %event_id, "Annotation target not found");
        }
        added
    }

    pub fn get_statistics(&self) -> EventStatistics {
        self.state.lock().store.statistics()
    }

    pub fn buffer_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Buffered, not yet processed events, oldest first
    pub fn buffered_events(&self) -> Vec<RecordedEvent> {
        self.state.lock().queue.snapshot()
    }

    pub fn buffer_stats(&self) -> QueueStats {
        self.state.lock().queue.stats()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn options(&self) -> ProcessingOptions {
        self.options.read().clone()
    }

    /// Replace the options wholesale; a batch already running keeps its copy
    pub fn set_options(&self, options: ProcessingOptions) -> Result<()> {
        options.validate()?;

        let evicted = self
            .state
            .lock()
            .queue
            .set_capacity(options.max_buffer_size);
        if evicted > 0 {
            debug!(evicted, "Buffer shrunk, evicted oldest events");
            counter!("replay_pipeline_events_evicted_total").increment(evicted as u64);
        }

        *self.options.write() = options;
        Ok(())
    }

    /// Drop all buffered and processed state
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.queue.clear();
        state.store.clear();
        state.generation = state.generation.wrapping_add(1);
        gauge!("replay_pipeline_buffer_len").set(0.0);
        info!("Event pipeline cleared");
    }

    /// Snapshot for the code generator
    pub fn export_for_test_generation(&self) -> TestGenerationExport {
        let options = self.options();
        let state = self.state.lock();
        TestGenerationExport::new(
            state.store.events().to_vec(),
            state.store.groups().to_vec(),
            state.store.markers().to_vec(),
            state.store.statistics(),
            options,
            self.host.now_millis(),
        )
    }

    /// Render the export snapshot in `format`
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        Exporter::new(format).export(&self.export_for_test_generation())
    }
}

fn record_metrics(outcome: &BatchOutcome) {
    let stats = &outcome.stats;
    counter!("replay_pipeline_duplicates_removed_total").increment(stats.duplicates_removed as u64);
    counter!("replay_pipeline_noise_filtered_total").increment(stats.noisy_events_filtered as u64);
    counter!("replay_pipeline_events_merged_total").increment(stats.events_merged as u64);
    counter!("replay_pipeline_waits_added_total").increment(stats.wait_events_added as u64);
    counter!("replay_pipeline_events_grouped_total").increment(stats.events_grouped as u64);
    counter!("replay_pipeline_events_processed_total").increment(outcome.events.len() as u64);
}
