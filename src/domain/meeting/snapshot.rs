//! The decoded result of one meeting scan.

use serde::Serialize;
use tracing::warn;

use crate::domain::foundation::MeetingKey;
use crate::domain::stream::FinalPayload;

use super::{ExistingEvent, Meeting, MeetingDetails};

/// A proposed meeting and the calendar entries it overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    /// Key of the proposed meeting in [`WorkflowSnapshot::new_meetings`].
    pub meeting: MeetingKey,
    pub existing_events: Vec<ExistingEvent>,
}

/// Immutable state built from the `final` event of a scan.
///
/// Every conflict group refers to a meeting in `new_meetings` by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    new_meetings: Vec<Meeting>,
    conflicting_events: Vec<ConflictGroup>,
}

impl WorkflowSnapshot {
    /// Assigns meeting keys and correlates conflict groups with meetings.
    ///
    /// A conflict is attached to the first meeting not yet claimed by another
    /// group that is structurally identical to its `new_event`, otherwise to
    /// one whose title matches ignoring case and surrounding whitespace. A
    /// conflict naming no known meeting adds that meeting to the snapshot.
    pub fn from_final(payload: FinalPayload) -> Self {
        let mut new_meetings: Vec<Meeting> = payload
            .events_to_schedule
            .map(|list| list.meetings)
            .unwrap_or_default()
            .into_iter()
            .map(Meeting::new)
            .collect();

        let mut conflicting_events: Vec<ConflictGroup> = Vec::new();
        for conflict in payload.conflicting_events.unwrap_or_default() {
            let key = match correlate(&new_meetings, &conflicting_events, &conflict.new_event) {
                Some(key) => key,
                None => {
                    warn!(
                        summary = %conflict.new_event.summary,
                        "Conflict refers to a meeting missing from the scan; adding it"
                    );
                    let meeting = Meeting::new(conflict.new_event);
                    let key = meeting.key;
                    new_meetings.push(meeting);
                    key
                }
            };

            match conflicting_events.iter_mut().find(|g| g.meeting == key) {
                Some(group) => group.existing_events.extend(conflict.existing_events),
                None => conflicting_events.push(ConflictGroup {
                    meeting: key,
                    existing_events: conflict.existing_events,
                }),
            }
        }

        Self {
            new_meetings,
            conflicting_events,
        }
    }

    pub fn new_meetings(&self) -> &[Meeting] {
        &self.new_meetings
    }

    pub fn conflicting_events(&self) -> &[ConflictGroup] {
        &self.conflicting_events
    }

    /// Keys of all meetings, in scan order.
    pub fn keys(&self) -> impl Iterator<Item = MeetingKey> + '_ {
        self.new_meetings.iter().map(|m| m.key)
    }

    pub fn meeting(&self, key: MeetingKey) -> Option<&Meeting> {
        self.new_meetings.iter().find(|m| m.key == key)
    }

    pub fn conflicts_for(&self, key: MeetingKey) -> Option<&ConflictGroup> {
        self.conflicting_events.iter().find(|g| g.meeting == key)
    }

    pub fn has_conflicts(&self, key: MeetingKey) -> bool {
        self.conflicts_for(key)
            .is_some_and(|g| !g.existing_events.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.new_meetings.is_empty()
    }
}

fn titles_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn correlate(
    meetings: &[Meeting],
    groups: &[ConflictGroup],
    new_event: &MeetingDetails,
) -> Option<MeetingKey> {
    let claimed = |m: &&Meeting| groups.iter().any(|g| g.meeting == m.key);
    let exact = |m: &&Meeting| &m.details == new_event;
    let similar = |m: &&Meeting| titles_match(&m.details.summary, &new_event.summary);

    meetings
        .iter()
        .filter(|m| !claimed(m))
        .find(exact)
        .or_else(|| meetings.iter().find(exact))
        .or_else(|| meetings.iter().filter(|m| !claimed(m)).find(similar))
        .or_else(|| meetings.iter().find(similar))
        .map(|m| m.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meeting::{Attendee, EventTime};
    use crate::domain::stream::{ConflictPayload, MeetingList};

    fn details(summary: &str, hour: u32) -> MeetingDetails {
        MeetingDetails {
            summary: summary.to_string(),
            start: EventTime::new(format!("2024-03-20T{:02}:00:00Z", hour), "UTC"),
            end: EventTime::new(format!("2024-03-20T{:02}:30:00Z", hour), "UTC"),
            location: None,
            attendees: vec![Attendee::new("a@example.com")],
        }
    }

    fn existing(summary: &str) -> ExistingEvent {
        ExistingEvent {
            summary: summary.to_string(),
            start: EventTime::new("2024-03-20T10:00:00Z", "UTC"),
            end: EventTime::new("2024-03-20T11:00:00Z", "UTC"),
            location: None,
            description: None,
            attendees: vec![],
        }
    }

    fn payload(meetings: Vec<MeetingDetails>, conflicts: Option<Vec<ConflictPayload>>) -> FinalPayload {
        FinalPayload {
            events_to_schedule: Some(MeetingList { meetings }),
            conflicting_events: conflicts,
        }
    }

    #[test]
    fn snapshot_without_conflicts() {
        let snapshot = WorkflowSnapshot::from_final(payload(vec![details("Sync", 10)], None));

        assert_eq!(snapshot.new_meetings().len(), 1);
        assert_eq!(snapshot.new_meetings()[0].summary(), "Sync");
        assert!(snapshot.conflicting_events().is_empty());
    }

    #[test]
    fn conflict_group_is_keyed_to_its_meeting() {
        let m = details("Sync", 10);
        let snapshot = WorkflowSnapshot::from_final(payload(
            vec![m.clone()],
            Some(vec![ConflictPayload {
                new_event: m,
                existing_events: vec![existing("E1"), existing("E2")],
            }]),
        ));

        assert_eq!(snapshot.new_meetings().len(), 1);
        let key = snapshot.new_meetings()[0].key;
        let group = &snapshot.conflicting_events()[0];
        assert_eq!(group.meeting, key);
        assert_eq!(group.existing_events.len(), 2);
        assert!(snapshot.has_conflicts(key));
    }

    #[test]
    fn duplicate_titles_correlate_by_content() {
        let morning = details("Sync", 9);
        let afternoon = details("Sync", 15);
        let snapshot = WorkflowSnapshot::from_final(payload(
            vec![morning, afternoon.clone()],
            Some(vec![ConflictPayload {
                new_event: afternoon,
                existing_events: vec![existing("E1")],
            }]),
        ));

        let afternoon_key = snapshot.new_meetings()[1].key;
        let morning_key = snapshot.new_meetings()[0].key;
        assert!(snapshot.has_conflicts(afternoon_key));
        assert!(!snapshot.has_conflicts(morning_key));
    }

    #[test]
    fn title_fallback_ignores_case_and_whitespace() {
        let mut renamed = details("Sync", 10);
        renamed.summary = "  SYNC ".to_string();
        renamed.location = Some("elsewhere".to_string());
        let snapshot = WorkflowSnapshot::from_final(payload(
            vec![details("Sync", 10)],
            Some(vec![ConflictPayload {
                new_event: renamed,
                existing_events: vec![existing("E1")],
            }]),
        ));

        assert_eq!(snapshot.new_meetings().len(), 1);
        assert_eq!(snapshot.conflicting_events()[0].meeting, snapshot.new_meetings()[0].key);
    }

    #[test]
    fn orphan_conflict_adds_its_meeting() {
        let snapshot = WorkflowSnapshot::from_final(payload(
            vec![details("Sync", 10)],
            Some(vec![ConflictPayload {
                new_event: details("Offsite", 12),
                existing_events: vec![existing("E1")],
            }]),
        ));

        assert_eq!(snapshot.new_meetings().len(), 2);
        let offsite = snapshot.new_meetings()[1].key;
        assert_eq!(snapshot.conflicting_events()[0].meeting, offsite);
    }

    #[test]
    fn groups_for_the_same_meeting_are_merged() {
        let m = details("Sync", 10);
        let snapshot = WorkflowSnapshot::from_final(payload(
            vec![m.clone()],
            Some(vec![
                ConflictPayload { new_event: m.clone(), existing_events: vec![existing("E1")] },
                ConflictPayload { new_event: m, existing_events: vec![existing("E2")] },
            ]),
        ));

        assert_eq!(snapshot.conflicting_events().len(), 1);
        assert_eq!(snapshot.conflicting_events()[0].existing_events.len(), 2);
    }

    #[test]
    fn null_meetings_yield_empty_snapshot() {
        let snapshot = WorkflowSnapshot::from_final(FinalPayload::default());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.keys().count(), 0);
    }

    #[test]
    fn serializes_with_camel_case_sections() {
        let snapshot = WorkflowSnapshot::from_final(payload(vec![details("Sync", 10)], None));
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("newMeetings").is_some());
        assert!(value.get("conflictingEvents").is_some());
    }
}
