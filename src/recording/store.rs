// src/recording/store.rs
//! Processed event store
//!
//! Append-only accumulation of transformed events, event groups and timeline
//! markers, plus the running statistics. Only the pipeline mutates it; callers
//! get cloned snapshots.

use crate::recording::event::{EventAnnotation, EventGroup, RecordedEvent, TimelineMarker};
use crate::recording::stages::{BatchOutcome, BatchStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Running counters over every committed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStatistics {
    /// Events written to the store, synthetic waits included
    pub total_processed: u64,
    pub duplicates_removed: u64,
    pub noisy_events_filtered: u64,
    pub events_merged: u64,
    pub events_grouped: u64,
    pub wait_events_added: u64,
}

impl EventStatistics {
    fn absorb(&mut self, stats: &BatchStats, committed: usize) {
        self.total_processed += committed as u64;
        self.duplicates_removed += stats.duplicates_removed as u64;
        self.noisy_events_filtered += stats.noisy_events_filtered as u64;
        self.events_merged += stats.events_merged as u64;
        self.events_grouped += stats.events_grouped as u64;
        self.wait_events_added += stats.wait_events_added as u64;
    }
}

#[derive(Debug, Default)]
pub struct ProcessedStore {
    events: Vec<RecordedEvent>,
    event_index: HashMap<String, usize>,
    groups: Vec<EventGroup>,
    group_index: HashMap<String, usize>,
    markers: Vec<TimelineMarker>,
    stats: EventStatistics,
}

impl ProcessedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transformed batch and fold its counters into the statistics
    pub fn commit(&mut self, outcome: BatchOutcome) {
        let committed = outcome.events.len();

        for event in outcome.events {
            self.event_index.insert(event.id.clone(), self.events.len());
            self.events.push(event);
        }
        for group in outcome.groups {
            self.insert_group(group);
        }

        self.stats.absorb(&outcome.stats, committed);
        debug!(committed, total = self.events.len(), "Batch committed to store");
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.event_index.contains_key(event_id)
    }

    pub fn event(&self, event_id: &str) -> Option<&RecordedEvent> {
        self.event_index.get(event_id).map(|&i| &self.events[i])
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn groups(&self) -> &[EventGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: &str) -> Option<&EventGroup> {
        self.group_index.get(group_id).map(|&i| &self.groups[i])
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn markers(&self) -> &[TimelineMarker] {
        &self.markers
    }

    pub fn statistics(&self) -> EventStatistics {
        self.stats
    }

    /// Append an annotation; returns false if the event is unknown
    pub fn annotate(&mut self, event_id: &str, annotation: EventAnnotation) -> bool {
        match self.event_index.get(event_id) {
            Some(&i) => {
                self.events[i].metadata.annotations.push(annotation);
                true
            }
            None => false,
        }
    }

    /// Create a group from existing events
    ///
    /// Unknown ids are skipped. An event that already belongs to a group is
    /// moved out of it, so every event stays in at most one group.
    pub fn create_group(
        &mut self,
        event_ids: &[String],
        name: impl Into<String>,
        description: Option<String>,
    ) -> String {
        let mut group = EventGroup::new(name, description);

        for event_id in event_ids {
            let Some(&i) = self.event_index.get(event_id) else {
                debug!(event_id = %event_id, "Skipping unknown event in manual group");
                continue;
            };
            if group.events.contains(event_id) {
                continue;
            }

            if let Some(previous) = self.events[i].metadata.group.take() {
                if let Some(&g) = self.group_index.get(&previous) {
                    self.groups[g].events.retain(|id| id != event_id);
                }
            }

            self.events[i].metadata.group = Some(group.id.clone());
            group.events.push(event_id.clone());
        }

        let id = group.id.clone();
        self.insert_group(group);
        id
    }

    pub fn set_group_collapsed(&mut self, group_id: &str, collapsed: bool) -> bool {
        match self.group_index.get(group_id) {
            Some(&g) => {
                self.groups[g].collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    /// Insert a marker, keeping markers ordered by timestamp
    pub fn add_marker(&mut self, marker: TimelineMarker) -> String {
        let id = marker.id.clone();
        let at = self
            .markers
            .partition_point(|m| m.timestamp <= marker.timestamp);
        self.markers.insert(at, marker);
        id
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn insert_group(&mut self, group: EventGroup) {
        self.group_index.insert(group.id.clone(), self.groups.len());
        self.groups.push(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::event::{AnnotationKind, EventType, MarkerKind};

    fn store_with(ids: &[&str]) -> ProcessedStore {
        let mut store = ProcessedStore::new();
        store.commit(BatchOutcome {
            original_count: ids.len(),
            events: ids
                .iter()
                .enumerate()
                .map(|(i, id)| RecordedEvent::new(*id, EventType::Click, i as u64, i as u64, "#btn"))
                .collect(),
            groups: Vec::new(),
            stats: BatchStats {
                duplicates_removed: 2,
                ..Default::default()
            },
        });
        store
    }

    fn owned(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_commit_updates_statistics() {
        let store = store_with(&["a", "b", "c"]);
        let stats = store.statistics();
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.duplicates_removed, 2);
        assert!(store.contains("b"));
        assert_eq!(store.event("c").map(|e| e.timestamp), Some(2));
    }

    #[test]
    fn test_annotate() {
        let mut store = store_with(&["a"]);
        let note = EventAnnotation::new(AnnotationKind::Note, "flaky button", 10);

        assert!(store.annotate("a", note.clone()));
        assert!(!store.annotate("missing", note));
        assert_eq!(store.event("a").unwrap().metadata.annotations.len(), 1);
    }

    #[test]
    fn test_manual_group_moves_members() {
        let mut store = store_with(&["a", "b", "c"]);

        let first = store.create_group(&owned(&["a", "b"]), "Login", None);
        let second = store.create_group(&owned(&["b", "c", "missing", "c"]), "Checkout", None);

        assert_eq!(store.group(&first).unwrap().events, owned(&["a"]));
        assert_eq!(store.group(&second).unwrap().events, owned(&["b", "c"]));
        assert_eq!(store.event("b").unwrap().metadata.group.as_ref(), Some(&second));
        assert_eq!(store.group_count(), 2);
    }

    #[test]
    fn test_collapse_unknown_group() {
        let mut store = store_with(&["a"]);
        let id = store.create_group(&owned(&["a"]), "One", None);

        assert!(store.set_group_collapsed(&id, true));
        assert!(store.group(&id).unwrap().collapsed);
        assert!(!store.set_group_collapsed("group_missing", true));
    }

    #[test]
    fn test_markers_stay_sorted() {
        let mut store = ProcessedStore::new();
        store.add_marker(TimelineMarker::new(300, MarkerKind::End, "end"));
        store.add_marker(TimelineMarker::new(100, MarkerKind::Start, "start"));
        store.add_marker(TimelineMarker::new(200, MarkerKind::Milestone, "cart"));
        store.add_marker(TimelineMarker::new(200, MarkerKind::Error, "oops"));

        let labels: Vec<&str> = store.markers().iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["start", "cart", "oops", "end"]);
    }

    #[test]
    fn test_clear() {
        let mut store = store_with(&["a", "b"]);
        store.create_group(&owned(&["a"]), "G", None);
        store.add_marker(TimelineMarker::new(1, MarkerKind::Start, "start"));

        store.clear();
        assert!(store.events().is_empty());
        assert!(store.groups().is_empty());
        assert!(store.markers().is_empty());
        assert_eq!(store.statistics(), EventStatistics::default());
        assert!(!store.contains("a"));
    }
}
