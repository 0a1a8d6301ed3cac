// src/recording/stages/merge.rs
//! Consecutive-event merging
//!
//! Collapses adjacent events on the same target that represent one logical
//! action:
//!
//! - `keydown` then `input` becomes the `input`
//! - `click` then `click` within [`DOUBLE_CLICK_WINDOW_MS`] becomes a `dblclick`
//!
//! The walk is greedy and left to right; a merged event becomes the current
//! event and can merge again with whatever follows it.

use crate::recording::event::{EventData, EventType, RecordedEvent};
use crate::recording::stages::BatchStats;
use serde_json::Value;
use tracing::trace;

/// Two clicks closer than this merge into a double click
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeRule {
    KeyIntoInput,
    DoubleClick,
}

fn merge_rule(current: &RecordedEvent, next: &RecordedEvent) -> Option<MergeRule> {
    if current.target.selector != next.target.selector {
        return None;
    }

    match (current.event_type, next.event_type) {
        (EventType::Keydown, EventType::Input) => Some(MergeRule::KeyIntoInput),
        (EventType::Click, EventType::Click)
            if next.timestamp.saturating_sub(current.timestamp) < DOUBLE_CLICK_WINDOW_MS =>
        {
            Some(MergeRule::DoubleClick)
        }
        _ => None,
    }
}

/// Original ids an event stands for
fn source_ids(event: &RecordedEvent) -> Vec<String> {
    let ids = event.merged_from();
    if ids.is_empty() {
        vec![event.id.clone()]
    } else {
        ids
    }
}

fn apply(rule: MergeRule, current: RecordedEvent, next: RecordedEvent) -> RecordedEvent {
    let mut merged_from = source_ids(&current);
    merged_from.extend(source_ids(&next));

    let mut merged = match rule {
        MergeRule::KeyIntoInput => next,
        MergeRule::DoubleClick => {
            let mut merged = current;
            merged.event_type = EventType::Dblclick;
            if let EventData::Mouse { click_count, .. } = &mut merged.data {
                *click_count = 2;
            }
            merged
        }
    };

    merged.metadata.custom.insert(
        "mergedFrom".to_string(),
        Value::from(merged_from),
    );
    merged
}

/// Merge adjacent events on the same target
pub fn merge_consecutive(events: Vec<RecordedEvent>, stats: &mut BatchStats) -> Vec<RecordedEvent> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    let Some(mut current) = iter.next() else {
        return out;
    };

    for next in iter {
        match merge_rule(&current, &next) {
            Some(rule) => {
                trace!(first = %current.id, second = %next.id, ?rule, "Merging consecutive events");
                current = apply(rule, current, next);
                stats.events_merged += 1;
            }
            None => {
                out.push(std::mem::replace(&mut current, next));
            }
        }
    }

    out.push(current);
    out
}
