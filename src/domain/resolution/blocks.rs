//! Text of the generated resolution blocks.
//!
//! Every block ends with a blank line so blocks read as paragraphs when
//! concatenated with each other and with user notes.

use crate::domain::meeting::{describe_existing_event, describe_meeting, ExistingEvent, Meeting};

const BLOCK_END: &str = "\n\n";

/// Covers every proposed meeting at once.
pub fn select_all_block(meetings: &[Meeting]) -> String {
    let mut text = String::from("Schedule all proposed meetings as suggested:\n");
    for meeting in meetings {
        text.push_str(&format!("- {}\n", describe_meeting(&meeting.details)));
    }
    text.push('\n');
    text
}

/// Schedules one meeting as proposed.
pub fn schedule_block(meeting: &Meeting) -> String {
    format!("Schedule {}.{}", describe_meeting(&meeting.details), BLOCK_END)
}

/// Replaces the calendar entries that overlap a meeting.
pub fn replace_conflicts_block(meeting: &Meeting, existing: &[ExistingEvent]) -> String {
    let mut text = format!(
        "Schedule {} and replace the conflicting events:\n",
        describe_meeting(&meeting.details)
    );
    for event in existing {
        text.push_str(&format!("- {}\n", describe_existing_event(event)));
    }
    text.push('\n');
    text
}

/// Free-text instructions the user wrote for one meeting.
pub fn draft_block(meeting: &Meeting, draft: &str) -> String {
    format!(
        "For {}: {}{}",
        describe_meeting(&meeting.details),
        draft.trim(),
        BLOCK_END
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meeting::{EventTime, MeetingDetails};

    fn meeting(summary: &str) -> Meeting {
        Meeting::new(MeetingDetails {
            summary: summary.to_string(),
            start: EventTime::new("2024-03-20T10:00:00Z", "UTC"),
            end: EventTime::new("2024-03-20T11:00:00Z", "UTC"),
            location: None,
            attendees: vec![],
        })
    }

    fn existing(summary: &str) -> ExistingEvent {
        ExistingEvent {
            summary: summary.to_string(),
            start: EventTime::new("2024-03-20T10:30:00Z", "UTC"),
            end: EventTime::new("2024-03-20T11:00:00Z", "UTC"),
            location: None,
            description: None,
            attendees: vec![],
        }
    }

    #[test]
    fn every_block_ends_with_blank_line() {
        let m = meeting("Sync");
        for text in [
            select_all_block(std::slice::from_ref(&m)),
            schedule_block(&m),
            replace_conflicts_block(&m, &[existing("Standup")]),
            draft_block(&m, "move to 3pm"),
        ] {
            assert!(text.ends_with("\n\n"), "block {:?}", text);
        }
    }

    #[test]
    fn select_all_lists_every_meeting() {
        let text = select_all_block(&[meeting("Sync"), meeting("Review")]);
        assert!(text.contains("- \"Sync\""));
        assert!(text.contains("- \"Review\""));
    }

    #[test]
    fn replace_block_enumerates_existing_events() {
        let text = replace_conflicts_block(&meeting("Sync"), &[existing("E1"), existing("E2")]);
        assert!(text.starts_with("Schedule \"Sync\""));
        assert!(text.contains("- \"E1\""));
        assert!(text.contains("- \"E2\""));
    }

    #[test]
    fn draft_block_contains_details_and_text() {
        let text = draft_block(&meeting("Sync"), "  push to Friday ");
        assert_eq!(
            text,
            "For \"Sync\" on Wed Mar 20, 2024 10:00 AM - 11:00 AM (UTC): push to Friday\n\n"
        );
    }
}
