//! Typed events carried by the workflow stream.
//!
//! Each frame is a JSON object discriminated by its `type` field:
//!
//! ```text
//! {"type": "thread_id", "content": "..."}
//! {"type": "message", "content": "Scanning inbox"}
//! {"type": "events_to_schedule", "data": {"meetings": [...]}}
//! {"type": "final", "data": {"events_to_schedule": {...}, "conflicting_events": [...] | null}}
//! {"type": "meetings_scheduled", "data": {"meetings": [...]}}
//! {"type": "error", "data": "..."}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::meeting::{ExistingEvent, MeetingDetails, ScheduledMeeting};

/// Frame `type` values this decoder understands.
pub const KNOWN_EVENT_TYPES: &[&str] = &[
    "thread_id",
    "message",
    "events_to_schedule",
    "final",
    "meetings_scheduled",
    "error",
];

/// One decoded frame of the workflow stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Backend conversation id; needed later to submit the resolution.
    ThreadId {
        #[serde(deserialize_with = "text_or_json")]
        content: String,
    },
    /// Transient progress text for display.
    Message {
        #[serde(deserialize_with = "text_or_json")]
        content: String,
    },
    /// Preview of the meetings found so far.
    EventsToSchedule { data: MeetingList },
    /// Terminal scan result.
    Final { data: FinalPayload },
    /// Terminal scheduling confirmation.
    MeetingsScheduled { data: ScheduledMeetingList },
    /// Terminal failure reported by the backend workflow.
    Error {
        #[serde(deserialize_with = "text_or_json")]
        data: String,
    },
}

impl StreamEvent {
    /// The wire `type` of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::ThreadId { .. } => "thread_id",
            StreamEvent::Message { .. } => "message",
            StreamEvent::EventsToSchedule { .. } => "events_to_schedule",
            StreamEvent::Final { .. } => "final",
            StreamEvent::MeetingsScheduled { .. } => "meetings_scheduled",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Returns true for events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Final { .. }
                | StreamEvent::MeetingsScheduled { .. }
                | StreamEvent::Error { .. }
        )
    }
}

/// `{ "meetings": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingList {
    #[serde(default)]
    pub meetings: Vec<MeetingDetails>,
}

/// Payload of the `final` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPayload {
    /// Null when the scan found nothing to schedule.
    #[serde(default)]
    pub events_to_schedule: Option<MeetingList>,
    /// Null when no proposed meeting overlaps the calendar.
    #[serde(default)]
    pub conflicting_events: Option<Vec<ConflictPayload>>,
}

/// A proposed meeting with the calendar entries it overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPayload {
    pub new_event: MeetingDetails,
    #[serde(default)]
    pub existing_events: Vec<ExistingEvent>,
}

/// `{ "meetings": [...] }` after scheduling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMeetingList {
    #[serde(default)]
    pub meetings: Vec<ScheduledMeeting>,
}

/// Accepts a JSON string as-is and renders any other JSON value as text.
fn text_or_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
