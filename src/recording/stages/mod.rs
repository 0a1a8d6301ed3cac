// src/recording/stages/mod.rs
//! Batch transform stages
//!
//! Every batch runs through the same fixed sequence:
//!
//! ```text
//! raw batch → Deduplicate → Filter noise → Merge consecutive
//!                                                  ↓
//!                      groups ← Group forms ← Insert smart waits
//! ```
//!
//! Each stage consumes the previous stage's list and returns a new one. Stage
//! counters go into a [`BatchStats`] owned by the batch, which the pipeline
//! folds into its running statistics once the batch is committed.

pub mod dedup;
pub mod grouping;
pub mod merge;
pub mod noise;
pub mod waits;

use crate::recording::event::{EventGroup, RecordedEvent};
use crate::recording::host::{FormResolver, Host};
use crate::recording::pipeline::ProcessingOptions;
use serde::Serialize;
use tracing::debug;

pub use dedup::{deduplicate, DEDUP_BUCKET_MS};
pub use grouping::group_form_events;
pub use merge::{merge_consecutive, DOUBLE_CLICK_WINDOW_MS};
pub use noise::{filter_noise, is_noise};
pub use waits::{insert_smart_waits, SMART_WAIT_THRESHOLD_MS};

/// Counters accumulated while transforming one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub duplicates_removed: usize,
    pub noisy_events_filtered: usize,
    pub events_merged: usize,
    pub wait_events_added: usize,
    pub events_grouped: usize,
}

impl BatchStats {
    /// Events dropped from the batch by dedup, noise filtering and merging
    pub fn removed(&self) -> usize {
        self.duplicates_removed + self.noisy_events_filtered + self.events_merged
    }

    /// Human-readable summary, one line per stage that changed something
    pub fn optimizations(&self, groups_created: usize) -> Vec<String> {
        let mut lines = Vec::new();
        if self.duplicates_removed > 0 {
            lines.push(format!("Removed {} duplicate events", self.duplicates_removed));
        }
        if self.noisy_events_filtered > 0 {
            lines.push(format!("Filtered {} noisy events", self.noisy_events_filtered));
        }
        if self.events_merged > 0 {
            lines.push(format!("Merged {} consecutive events", self.events_merged));
        }
        if self.wait_events_added > 0 {
            lines.push(format!("Added {} smart waits", self.wait_events_added));
        }
        if groups_created > 0 {
            lines.push(format!(
                "Created {} event groups ({} events)",
                groups_created, self.events_grouped
            ));
        }
        lines
    }
}

/// Capabilities and store state a batch needs
pub struct StageContext<'a> {
    pub host: &'a dyn Host,
    pub resolver: &'a dyn FormResolver,

    /// Number used for the first automatically created group
    pub next_group_number: usize,
}

/// Output of one batch transform
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub original_count: usize,
    pub events: Vec<RecordedEvent>,
    pub groups: Vec<EventGroup>,
    pub stats: BatchStats,
}

/// Run a batch through every enabled stage, in order
pub fn transform_batch(
    batch: Vec<RecordedEvent>,
    options: &ProcessingOptions,
    ctx: &StageContext<'_>,
) -> BatchOutcome {
    let original_count = batch.len();
    let mut stats = BatchStats::default();
    let mut events = batch;

    if options.deduplicate {
        events = deduplicate(events, &mut stats);
    }
    if options.filter_noise {
        events = filter_noise(events, &mut stats);
    }
    if options.merge_consecutive {
        events = merge_consecutive(events, &mut stats);
    }
    if options.add_smart_waits {
        events = insert_smart_waits(events, ctx.host, &mut stats);
    }

    let groups = if options.group_related {
        group_form_events(&mut events, ctx.resolver, ctx.next_group_number, &mut stats)
    } else {
        Vec::new()
    };

    debug!(
        original = original_count,
        processed = events.len(),
        duplicates = stats.duplicates_removed,
        noise = stats.noisy_events_filtered,
        merged = stats.events_merged,
        waits = stats.wait_events_added,
        groups = groups.len(),
        "Batch transformed"
    );

    BatchOutcome {
        original_count,
        events,
        groups,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::event::{EventData, EventType};
    use crate::recording::host::{FixedHost, StaticFormResolver};

    fn event(id: &str, event_type: EventType, timestamp: u64, selector: &str) -> RecordedEvent {
        RecordedEvent::new(id, event_type, timestamp, timestamp, selector)
    }

    fn typed(id: &str, timestamp: u64, selector: &str, value: &str) -> RecordedEvent {
        event(id, EventType::Input, timestamp, selector).with_data(EventData::Keyboard {
            key: String::new(),
            code: String::new(),
            input_value: Some(value.to_string()),
            modifiers: Vec::new(),
        })
    }

    #[test]
    fn test_full_batch() {
        let host = FixedHost::new(0, "https://example.test/login");
        let resolver = StaticFormResolver::new()
            .with_field("#user", "form#login")
            .with_field("#pass", "form#login");
        let ctx = StageContext {
            host: &host,
            resolver: &resolver,
            next_group_number: 1,
        };

        let batch = vec![
            event("e1", EventType::Click, 0, "#user"),
            event("e2", EventType::Click, 20, "#user"), // same 100ms bucket
            event("e3", EventType::Mousemove, 50, "body"),
            event("e4", EventType::Keydown, 200, "#user"),
            typed("e5", 210, "#user", "alice"),
            typed("e6", 3_000, "#pass", "secret"),
            event("e7", EventType::Submit, 3_100, "#login-button"),
        ];

        let outcome = transform_batch(batch, &ProcessingOptions::default(), &ctx);

        assert_eq!(outcome.original_count, 7);
        assert_eq!(outcome.stats.duplicates_removed, 1);
        assert_eq!(outcome.stats.noisy_events_filtered, 1);
        assert_eq!(outcome.stats.events_merged, 1);
        assert_eq!(outcome.stats.wait_events_added, 1);
        assert_eq!(outcome.stats.removed(), 3);

        let types: Vec<EventType> = outcome.events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::Click,
                EventType::Input,
                EventType::Wait,
                EventType::Input,
                EventType::Submit,
            ]
        );

        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].name, "Auto Group 1");
        assert_eq!(outcome.groups[0].events, vec!["e5", "e6"]);
    }

    #[test]
    fn test_disabled_stages_pass_through() {
        let host = FixedHost::new(0, "about:blank");
        let resolver = StaticFormResolver::new();
        let ctx = StageContext {
            host: &host,
            resolver: &resolver,
            next_group_number: 1,
        };
        let options = ProcessingOptions {
            deduplicate: false,
            merge_consecutive: false,
            filter_noise: false,
            group_related: false,
            add_smart_waits: false,
            ..Default::default()
        };

        let batch = vec![
            event("e1", EventType::Mousemove, 0, "body"),
            event("e2", EventType::Mousemove, 0, "body"),
            event("e3", EventType::Click, 5_000, "#btn"),
        ];

        let outcome = transform_batch(batch.clone(), &options, &ctx);
        assert_eq!(outcome.events, batch);
        assert_eq!(outcome.stats, BatchStats::default());
    }

    #[test]
    fn test_optimization_lines_skip_zero_counters() {
        let stats = BatchStats {
            duplicates_removed: 2,
            wait_events_added: 1,
            ..Default::default()
        };

        assert_eq!(
            stats.optimizations(0),
            vec!["Removed 2 duplicate events", "Added 1 smart waits"]
        );
        assert!(BatchStats::default().optimizations(0).is_empty());
    }
}
