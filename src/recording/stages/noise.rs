// src/recording/stages/noise.rs
//! Noise filtering
//!
//! Removes events that carry nothing a replay needs: pointer movement,
//! viewport resizes, zero-delta scrolls and blank input. Checkbox and radio
//! toggles carry `checked` instead of a value and are kept.

use crate::recording::event::{EventData, EventType, RecordedEvent};
use crate::recording::stages::BatchStats;
use tracing::trace;

/// Whether an event is noise for replay purposes
pub fn is_noise(event: &RecordedEvent) -> bool {
    match event.event_type {
        EventType::Mousemove | EventType::Resize => true,
        EventType::Scroll => matches!(
            event.data,
            EventData::Scroll { scroll_x, scroll_y } if scroll_x == 0.0 && scroll_y == 0.0
        ),
        EventType::Input => match &event.data {
            EventData::Form {
                checked: Some(_), ..
            } => false,
            data => data.typed_value().map_or(true, |value| value.trim().is_empty()),
        },
        _ => false,
    }
}

/// Drop noise events, keeping order
pub fn filter_noise(events: Vec<RecordedEvent>, stats: &mut BatchStats) -> Vec<RecordedEvent> {
    let before = events.len();
    let kept: Vec<RecordedEvent> = events
        .into_iter()
        .filter(|event| {
            let noisy = is_noise(event);
            if noisy {
                trace!(event_id = %event.id, event_type = %event.event_type, "Filtering noise event");
            }
            !noisy
        })
        .collect();

    stats.noisy_events_filtered += before - kept.len();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(id: &str, scroll_x: f64, scroll_y: f64) -> RecordedEvent {
        RecordedEvent::new(id, EventType::Scroll, 0, 0, "window")
            .with_data(EventData::Scroll { scroll_x, scroll_y })
    }

    fn input(id: &str, value: Option<&str>) -> RecordedEvent {
        RecordedEvent::new(id, EventType::Input, 0, 0, "#name").with_data(EventData::Keyboard {
            key: String::new(),
            code: String::new(),
            input_value: value.map(str::to_string),
            modifiers: Vec::new(),
        })
    }

    #[test]
    fn test_scroll_delta() {
        assert!(is_noise(&scroll("s1", 0.0, 0.0)));
        assert!(!is_noise(&scroll("s2", 0.0, 50.0)));
        assert!(!is_noise(&scroll("s3", -10.0, 0.0)));
    }

    #[test]
    fn test_mousemove_always_noise() {
        let plain = RecordedEvent::new("m1", EventType::Mousemove, 0, 0, "body");
        let with_payload = plain.clone().with_data(EventData::Mouse {
            button: 0,
            client_x: 120.0,
            client_y: 40.0,
            click_count: 0,
        });

        assert!(is_noise(&plain));
        assert!(is_noise(&with_payload));
        assert!(is_noise(&RecordedEvent::new("r1", EventType::Resize, 0, 0, "window")));
    }

    #[test]
    fn test_blank_input() {
        assert!(is_noise(&input("i1", None)));
        assert!(is_noise(&input("i2", Some(""))));
        assert!(is_noise(&input("i3", Some("  \t"))));
        assert!(!is_noise(&input("i4", Some("bob"))));

        let form_value = RecordedEvent::new("i5", EventType::Input, 0, 0, "#name").with_data(
            EventData::Form {
                value: Some("bob".into()),
                checked: None,
                selected_options: Vec::new(),
            },
        );
        assert!(!is_noise(&form_value));
    }

    #[test]
    fn test_checkbox_toggle_kept() {
        let toggle = |id: &str, checked: Option<bool>| {
            RecordedEvent::new(id, EventType::Input, 0, 0, "#terms").with_data(EventData::Form {
                value: None,
                checked,
                selected_options: Vec::new(),
            })
        };

        assert!(!is_noise(&toggle("t1", Some(true))));
        assert!(!is_noise(&toggle("t2", Some(false))));
        assert!(is_noise(&toggle("t3", None)));
    }

    #[test]
    fn test_filter_counts() {
        let mut stats = BatchStats::default();
        let events = vec![
            scroll("s1", 0.0, 0.0),
            RecordedEvent::new("c1", EventType::Click, 0, 1, "#btn"),
            scroll("s2", 0.0, 50.0),
            input("i1", Some(" ")),
        ];

        let kept = filter_noise(events, &mut stats);
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "s2"]);
        assert_eq!(stats.noisy_events_filtered, 2);
    }
}
