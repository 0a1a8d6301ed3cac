// src/recording/query.rs
//! Read-only filtering and sorting over processed events

use crate::recording::event::{EventGroup, EventType, RecordedEvent};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Events with a selector confidence below this count as errors
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Type,
    Target,
    Page,
    Group,
}

/// Query filters, applied in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilters {
    /// Keep only these types; empty keeps all
    pub types: HashSet<EventType>,

    /// Case-insensitive substring over type, selector, text and annotations
    pub search: Option<String>,

    pub errors_only: bool,

    pub hide_system: bool,

    pub sort_by: Option<SortKey>,
}

impl EventFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn errors_only(mut self) -> Self {
        self.errors_only = true;
        self
    }

    pub fn hide_system(mut self) -> Self {
        self.hide_system = true;
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = Some(key);
        self
    }

    /// Filter and sort a snapshot of `events`
    ///
    /// `groups` provides the ordering for [`SortKey::Group`]; ungrouped
    /// events sort last.
    pub fn apply(&self, events: &[RecordedEvent], groups: &[EventGroup]) -> Vec<RecordedEvent> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut out: Vec<RecordedEvent> = events
            .iter()
            .filter(|e| self.types.is_empty() || self.types.contains(&e.event_type))
            .filter(|e| needle.as_deref().map_or(true, |n| matches_search(e, n)))
            .filter(|e| !self.errors_only || is_error(e))
            .filter(|e| !self.hide_system || !e.event_type.is_system())
            .cloned()
            .collect();

        match self.sort_by {
            Some(SortKey::Type) => out.sort_by(|a, b| a.event_type.as_str().cmp(b.event_type.as_str())),
            Some(SortKey::Target) => out.sort_by(|a, b| a.target.selector.cmp(&b.target.selector)),
            Some(SortKey::Page) => out.sort_by(|a, b| a.context.url.cmp(&b.context.url)),
            Some(SortKey::Group) => {
                let rank: HashMap<&str, usize> = groups
                    .iter()
                    .enumerate()
                    .map(|(i, g)| (g.id.as_str(), i))
                    .collect();
                out.sort_by_key(|e| {
                    e.metadata
                        .group
                        .as_deref()
                        .and_then(|g| rank.get(g).copied())
                        .unwrap_or(usize::MAX)
                });
            }
            None => {}
        }

        out
    }
}

/// Capture-flagged failure or low selector confidence
pub fn is_error(event: &RecordedEvent) -> bool {
    event.has_error() || event.metadata.reliability.confidence < LOW_CONFIDENCE_THRESHOLD
}

fn matches_search(event: &RecordedEvent, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(event.event_type.as_str())
        || contains(&event.target.selector)
        || event.target.text_content.as_deref().map_or(false, contains)
        || event
            .metadata
            .annotations
            .iter()
            .any(|a| contains(&a.content))
}
