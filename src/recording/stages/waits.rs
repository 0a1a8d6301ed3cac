// src/recording/stages/waits.rs
//! Smart-wait synthesis
//!
//! A long pause between two recorded actions usually means the user waited
//! for the page. A synthetic `wait` event is inserted after the first action so
//! that generated tests reproduce the pause.

use crate::recording::event::{
    EventContext, EventData, EventMetadata, EventTarget, EventType, RecordedEvent, WaitReason,
};
use crate::recording::host::Host;
use crate::recording::stages::BatchStats;
use serde_json::{Map, Value};
use tracing::trace;

/// Gaps strictly longer than this get a wait event
pub const SMART_WAIT_THRESHOLD_MS: u64 = 1000;

const WAIT_CONDITION: &str = "Auto-detected delay";

fn synthesize_wait(after: &RecordedEvent, gap: u64, host: &dyn Host) -> RecordedEvent {
    let mut custom = Map::new();
    custom.insert("synthetic".to_string(), Value::Bool(true));
    custom.insert("generatedAt".to_string(), Value::from(host.now_millis()));

    RecordedEvent {
        id: format!("wait_{}", ulid::Ulid::new()),
        event_type: EventType::Wait,
        timestamp: after.timestamp + 1,
        sequence: after.sequence,
        target: EventTarget::default(),
        data: EventData::Wait {
            duration: gap,
            reason: WaitReason::Timeout,
            condition: Some(WAIT_CONDITION.to_string()),
        },
        context: EventContext {
            url: host.current_url(),
            title: after.context.title.clone(),
            viewport: after.context.viewport,
            user_agent: after.context.user_agent.clone(),
            ..Default::default()
        },
        metadata: EventMetadata {
            session_id: after.metadata.session_id.clone(),
            recording_mode: after.metadata.recording_mode,
            custom,
            ..Default::default()
        },
    }
}

/// Insert a wait after every event followed by a gap over the threshold
pub fn insert_smart_waits(
    events: Vec<RecordedEvent>,
    host: &dyn Host,
    stats: &mut BatchStats,
) -> Vec<RecordedEvent> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter().peekable();

    while let Some(event) = iter.next() {
        let wait = iter.peek().and_then(|next| {
            let gap = next.timestamp.saturating_sub(event.timestamp);
            (gap > SMART_WAIT_THRESHOLD_MS).then(|| synthesize_wait(&event, gap, host))
        });

        out.push(event);
        if let Some(wait) = wait {
            trace!(wait_id = %wait.id, "Inserting smart wait");
            stats.wait_events_added += 1;
            out.push(wait);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::host::FixedHost;

    fn click(id: &str, timestamp: u64) -> RecordedEvent {
        let mut event = RecordedEvent::new(id, EventType::Click, timestamp, timestamp, "#btn");
        event.metadata.session_id = "session-1".to_string();
        event
    }

    #[test]
    fn test_threshold_boundary() {
        let host = FixedHost::new(0, "https://example.test/");
        let mut stats = BatchStats::default();

        let short = insert_smart_waits(vec![click("a", 0), click("b", 999)], &host, &mut stats);
        assert_eq!(short.len(), 2);
        assert_eq!(stats.wait_events_added, 0);

        let exact = insert_smart_waits(vec![click("a", 0), click("b", 1000)], &host, &mut stats);
        assert_eq!(exact.len(), 2);

        let long = insert_smart_waits(vec![click("a", 0), click("b", 1001)], &host, &mut stats);
        assert_eq!(long.len(), 3);
        assert_eq!(stats.wait_events_added, 1);

        let wait = &long[1];
        assert_eq!(wait.event_type, EventType::Wait);
        assert_eq!(
            wait.data,
            EventData::Wait {
                duration: 1001,
                reason: WaitReason::Timeout,
                condition: Some("Auto-detected delay".to_string()),
            }
        );
    }

    #[test]
    fn test_wait_fields() {
        let host = FixedHost::new(42, "https://example.test/cart");
        let mut stats = BatchStats::default();

        let events = insert_smart_waits(
            vec![click("a", 5_000), click("b", 9_000)],
            &host,
            &mut stats,
        );

        let wait = &events[1];
        assert_eq!(wait.timestamp, 5_001);
        assert_eq!(wait.sequence, 5_000);
        assert_eq!(wait.context.url, "https://example.test/cart");
        assert_eq!(wait.metadata.session_id, "session-1");
        assert!(wait.is_synthetic());
        assert_eq!(events[2].id, "b");
    }

    #[test]
    fn test_multiple_gaps() {
        let host = FixedHost::new(0, "about:blank");
        let mut stats = BatchStats::default();

        let events = insert_smart_waits(
            vec![click("a", 0), click("b", 2_000), click("c", 2_500), click("d", 10_000)],
            &host,
            &mut stats,
        );

        let types: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::Click,
                EventType::Wait,
                EventType::Click,
                EventType::Click,
                EventType::Wait,
                EventType::Click,
            ]
        );
        assert_eq!(stats.wait_events_added, 2);
    }
}
