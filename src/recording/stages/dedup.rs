// src/recording/stages/dedup.rs
//! Duplicate removal
//!
//! Capture instrumentation sometimes reports the same action twice a few
//! milliseconds apart. Two events are duplicates when they share type, target
//! selector, target text and 100 ms time bucket; the first one wins.

use crate::recording::event::{EventType, RecordedEvent};
use crate::recording::stages::BatchStats;
use std::collections::HashSet;
use tracing::trace;

/// Width of the timestamp bucket used in the duplicate key
pub const DEDUP_BUCKET_MS: u64 = 100;

#[derive(Debug, PartialEq, Eq, Hash)]
struct DedupKey<'a> {
    event_type: EventType,
    selector: &'a str,
    text: &'a str,
    bucket: u64,
}

impl<'a> DedupKey<'a> {
    fn of(event: &'a RecordedEvent) -> Self {
        Self {
            event_type: event.event_type,
            selector: &event.target.selector,
            text: event.target.text_content.as_deref().unwrap_or(""),
            bucket: event.timestamp / DEDUP_BUCKET_MS,
        }
    }
}

/// Drop later occurrences of an already seen key, keeping order
pub fn deduplicate(events: Vec<RecordedEvent>, stats: &mut BatchStats) -> Vec<RecordedEvent> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(events.len());
        events.iter().map(|e| seen.insert(DedupKey::of(e))).collect()
    };

    let before = events.len();
    let kept: Vec<RecordedEvent> = events
        .into_iter()
        .zip(keep)
        .filter_map(|(event, keep)| {
            if !keep {
                trace!(event_id = %event.id, "Dropping duplicate event");
            }
            keep.then_some(event)
        })
        .collect();

    stats.duplicates_removed += before - kept.len();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(id: &str, timestamp: u64, selector: &str) -> RecordedEvent {
        RecordedEvent::new(id, EventType::Click, timestamp, timestamp, selector)
    }

    fn ids(events: &[RecordedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_same_bucket_is_duplicate() {
        let mut stats = BatchStats::default();
        let events = vec![click("a", 100, "#btn"), click("b", 199, "#btn")];

        let kept = deduplicate(events, &mut stats);
        assert_eq!(ids(&kept), vec!["a"]);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn test_bucket_boundary_is_distinct() {
        let mut stats = BatchStats::default();
        // 199 and 200 fall into different 100ms buckets
        let events = vec![click("a", 199, "#btn"), click("b", 200, "#btn")];

        let kept = deduplicate(events, &mut stats);
        assert_eq!(ids(&kept), vec!["a", "b"]);
        assert_eq!(stats.duplicates_removed, 0);
    }

    #[test]
    fn test_key_fields() {
        let mut stats = BatchStats::default();
        let events = vec![
            click("a", 0, "#btn"),
            click("b", 10, "#other"),
            click("c", 20, "#btn").with_text("Save"),
            RecordedEvent::new("d", EventType::Dblclick, 30, 30, "#btn"),
            click("e", 40, "#btn").with_text("Save"),
        ];

        let kept = deduplicate(events, &mut stats);
        assert_eq!(ids(&kept), vec!["a", "b", "c", "d"]);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut stats = BatchStats::default();
        let events = vec![
            click("a", 0, "#btn"),
            click("b", 50, "#btn"),
            click("c", 150, "#btn"),
            click("d", 160, "#btn"),
        ];

        let once = deduplicate(events, &mut stats);
        let removed = stats.duplicates_removed;
        let twice = deduplicate(once.clone(), &mut stats);

        assert_eq!(once, twice);
        assert_eq!(stats.duplicates_removed, removed);
    }
}
