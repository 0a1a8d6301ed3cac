// src/recording/event.rs
//! Recorded browser interaction events
//!
//! The capture layer hands the pipeline fully formed [`RecordedEvent`]s; the
//! types here are plain data and serialize with camelCase field names so that
//! they round-trip through the capture layer's JSON unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Interaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    // Pointer
    Click,
    Dblclick,
    Contextmenu,
    Mousedown,
    Mouseup,
    Mousemove,
    Hover,

    // Keyboard
    Keydown,
    Keyup,
    Keypress,

    // Form
    Input,
    Change,
    Focus,
    Blur,
    Submit,

    // Navigation
    Navigation,
    Reload,

    // Viewport
    Scroll,
    Resize,

    // Synthetic
    Wait,
    Assertion,
    Screenshot,
    Custom,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Dblclick => "dblclick",
            EventType::Contextmenu => "contextmenu",
            EventType::Mousedown => "mousedown",
            EventType::Mouseup => "mouseup",
            EventType::Mousemove => "mousemove",
            EventType::Hover => "hover",
            EventType::Keydown => "keydown",
            EventType::Keyup => "keyup",
            EventType::Keypress => "keypress",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::Submit => "submit",
            EventType::Navigation => "navigation",
            EventType::Reload => "reload",
            EventType::Scroll => "scroll",
            EventType::Resize => "resize",
            EventType::Wait => "wait",
            EventType::Assertion => "assertion",
            EventType::Screenshot => "screenshot",
            EventType::Custom => "custom",
        }
    }

    /// Form interactions considered by the grouper
    pub fn is_form_interaction(&self) -> bool {
        matches!(
            self,
            EventType::Input
                | EventType::Change
                | EventType::Focus
                | EventType::Blur
                | EventType::Submit
        )
    }

    /// Browser housekeeping events hidden by the "hide system" filter
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            EventType::Focus
                | EventType::Blur
                | EventType::Hover
                | EventType::Mousemove
                | EventType::Resize
                | EventType::Scroll
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    /// Unique event ID
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Capture time in milliseconds
    pub timestamp: u64,

    /// Position in the original capture order
    pub sequence: u64,

    pub target: EventTarget,

    #[serde(default)]
    pub data: EventData,

    #[serde(default)]
    pub context: EventContext,

    #[serde(default)]
    pub metadata: EventMetadata,
}

impl RecordedEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: EventType,
        timestamp: u64,
        sequence: u64,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type,
            timestamp,
            sequence,
            target: EventTarget::new(selector),
            data: EventData::None,
            context: EventContext::default(),
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.target.text_content = Some(text.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.context.url = url.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.metadata.reliability.confidence = confidence;
        self
    }

    /// Whether the capture layer flagged this event as failed
    pub fn has_error(&self) -> bool {
        self.metadata
            .custom
            .get("hasError")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Original ids recorded by the merger, empty if the event was never merged
    pub fn merged_from(&self) -> Vec<String> {
        self.metadata
            .custom
            .get("mergedFrom")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_synthetic(&self) -> bool {
        self.metadata
            .custom
            .get("synthetic")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// The element an event acted on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTarget {
    /// Primary selector
    pub selector: String,

    /// Fallback selectors, most reliable first
    #[serde(default)]
    pub alternative_selectors: Vec<String>,

    #[serde(default)]
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<BoundingRect>,

    /// Ancestor selectors, root first
    #[serde(default)]
    pub path: Vec<String>,
}

impl EventTarget {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Category-specific payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventData {
    #[serde(rename_all = "camelCase")]
    Mouse {
        #[serde(default)]
        button: u8,
        #[serde(default)]
        client_x: f64,
        #[serde(default)]
        client_y: f64,
        #[serde(default = "default_click_count")]
        click_count: u32,
    },

    #[serde(rename_all = "camelCase")]
    Keyboard {
        #[serde(default)]
        key: String,
        #[serde(default)]
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_value: Option<String>,
        #[serde(default)]
        modifiers: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    Form {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        #[serde(default)]
        selected_options: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    Navigation {
        #[serde(default)]
        from_url: String,
        to_url: String,
    },

    #[serde(rename_all = "camelCase")]
    Scroll {
        #[serde(default)]
        scroll_x: f64,
        #[serde(default)]
        scroll_y: f64,
    },

    Wait {
        duration: u64,
        reason: WaitReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Assertion {
        assertion_type: String,
        #[serde(default)]
        expected: Value,
    },

    Custom {
        #[serde(default)]
        payload: Value,
    },

    #[default]
    None,
}

fn default_click_count() -> u32 {
    1
}

impl EventData {
    /// Text value carried by keyboard or form payloads
    pub fn typed_value(&self) -> Option<&str> {
        match self {
            EventData::Keyboard { input_value, .. } => input_value.as_deref(),
            EventData::Form { value, .. } => value.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WaitReason {
    Timeout,
    Element,
    Network,
    Navigation,
    Custom,
}

/// Page state at capture time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default)]
    pub user_agent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingMode {
    #[default]
    Standard,
    Assertion,
    Screenshot,
}

/// Session, reliability and user data attached to an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default)]
    pub session_id: String,

    #[serde(default)]
    pub recording_mode: RecordingMode,

    #[serde(default)]
    pub reliability: ReliabilityMetrics,

    #[serde(default)]
    pub annotations: Vec<EventAnnotation>,

    /// Id of the group this event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default)]
    pub custom: Map<String, Value>,
}

/// How likely the event's selector is to resolve on replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReliabilityMetrics {
    /// Selector confidence, 0.0 - 1.0
    pub confidence: f64,
    pub alternative_count: u32,
    pub stable_selector: bool,
    pub stable_position: bool,
    pub timing_variability: f64,
    pub network_dependent: bool,
}

impl Default for ReliabilityMetrics {
    fn default() -> Self {
        Self {
            confidence: 1.0,
            alternative_count: 0,
            stable_selector: true,
            stable_position: true,
            timing_variability: 0.0,
            network_dependent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    Note,
    Warning,
    Error,
    Todo,
}

/// User note attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnnotation {
    pub id: String,
    pub kind: AnnotationKind,
    pub content: String,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl EventAnnotation {
    pub fn new(kind: AnnotationKind, content: impl Into<String>, created_at: u64) -> Self {
        Self {
            id: format!("ann_{}", ulid::Ulid::new()),
            kind,
            content: content.into(),
            created_at,
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Named collection of events forming one logical interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    /// Member event ids in event order
    pub events: Vec<String>,
}

impl EventGroup {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: format!("group_{}", ulid::Ulid::new()),
            name: name.into(),
            description,
            color: None,
            collapsed: false,
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Start,
    End,
    Milestone,
    Error,
}

/// Display-only point on the recording timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMarker {
    pub id: String,
    pub timestamp: u64,
    pub kind: MarkerKind,
    pub label: String,
}

impl TimelineMarker {
    pub fn new(timestamp: u64, kind: MarkerKind, label: impl Into<String>) -> Self {
        Self {
            id: format!("marker_{}", ulid::Ulid::new()),
            timestamp,
            kind,
            label: label.into(),
        }
    }
}
