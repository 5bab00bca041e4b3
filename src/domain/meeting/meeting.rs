//! Meeting value objects as they travel over the workflow stream.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::foundation::MeetingKey;

/// A zoned point in time as the calendar backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    /// ISO 8601 timestamp, with or without an explicit offset.
    #[serde(rename = "dateTime")]
    pub date_time: String,
    /// IANA zone name the timestamp is meant in.
    #[serde(rename = "timeZone", default)]
    pub time_zone: String,
}

impl EventTime {
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: time_zone.into(),
        }
    }
}

/// Attendee email address.
///
/// Proposed meetings list attendees as bare strings while calendar events
/// wrap them in `{ "email": ... }`; both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attendee(String);

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn email(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttendeeRepr {
    Plain(String),
    Object { email: String },
}

impl<'de> Deserialize<'de> for Attendee {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match AttendeeRepr::deserialize(deserializer)? {
            AttendeeRepr::Plain(email) | AttendeeRepr::Object { email } => Attendee(email),
        })
    }
}

impl Serialize for Attendee {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A meeting proposed by the workflow (wire shape, no identity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetails {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl MeetingDetails {
    /// Location if one was given and is not blank.
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// A pre-existing calendar entry that overlaps a proposed meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingEvent {
    #[serde(default)]
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// A proposed meeting with the stable key it carries through all state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meeting {
    pub key: MeetingKey,
    #[serde(flatten)]
    pub details: MeetingDetails,
}

impl Meeting {
    /// Assigns a fresh key to decoded meeting details.
    pub fn new(details: MeetingDetails) -> Self {
        Self {
            key: MeetingKey::new(),
            details,
        }
    }

    pub fn summary(&self) -> &str {
        &self.details.summary
    }
}

/// Confirmation for a meeting the backend put on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMeeting {
    pub summary: String,
    #[serde(default)]
    pub event_link: String,
    #[serde(default)]
    pub meeting_link: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meeting_details_deserialize_from_wire_shape() {
        let details: MeetingDetails = serde_json::from_value(json!({
            "summary": "Sync",
            "start": { "dateTime": "2024-03-20T10:00:00-04:00", "timeZone": "America/New_York" },
            "end": { "dateTime": "2024-03-20T11:00:00-04:00", "timeZone": "America/New_York" },
            "location": "Room 4",
            "attendees": ["a@example.com", "b@example.com"]
        }))
        .unwrap();

        assert_eq!(details.summary, "Sync");
        assert_eq!(details.start.time_zone, "America/New_York");
        assert_eq!(details.location(), Some("Room 4"));
        assert_eq!(details.attendees[1].email(), "b@example.com");
    }

    #[test]
    fn attendees_accept_email_objects() {
        let event: ExistingEvent = serde_json::from_value(json!({
            "summary": "Standup",
            "start": { "dateTime": "2024-03-20T10:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2024-03-20T10:15:00Z", "timeZone": "UTC" },
            "description": "daily",
            "attendees": [{ "email": "c@example.com" }, "d@example.com"]
        }))
        .unwrap();

        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].email(), "c@example.com");
        assert_eq!(event.attendees[1].email(), "d@example.com");
        assert_eq!(event.location, None);
    }

    #[test]
    fn missing_location_and_attendees_default() {
        let details: MeetingDetails = serde_json::from_value(json!({
            "summary": "Call",
            "start": { "dateTime": "2024-03-20T10:00:00Z" },
            "end": { "dateTime": "2024-03-20T10:30:00Z" }
        }))
        .unwrap();

        assert_eq!(details.location(), None);
        assert!(details.attendees.is_empty());
        assert_eq!(details.start.time_zone, "");
    }

    #[test]
    fn blank_location_is_treated_as_absent() {
        let details = MeetingDetails {
            summary: "Call".to_string(),
            start: EventTime::new("2024-03-20T10:00:00Z", "UTC"),
            end: EventTime::new("2024-03-20T10:30:00Z", "UTC"),
            location: Some("   ".to_string()),
            attendees: vec![],
        };
        assert_eq!(details.location(), None);
    }

    #[test]
    fn meeting_serializes_key_alongside_details() {
        let meeting = Meeting::new(MeetingDetails {
            summary: "Sync".to_string(),
            start: EventTime::new("2024-03-20T10:00:00Z", "UTC"),
            end: EventTime::new("2024-03-20T10:30:00Z", "UTC"),
            location: None,
            attendees: vec![Attendee::new("a@example.com")],
        });

        let value = serde_json::to_value(&meeting).unwrap();
        assert_eq!(value["key"], json!(meeting.key.to_string()));
        assert_eq!(value["summary"], json!("Sync"));
        assert_eq!(value["attendees"], json!(["a@example.com"]));
    }
}
