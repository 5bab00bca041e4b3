//! Human-readable rendering of meeting times and details.

use chrono::{DateTime, NaiveDateTime};

use super::{EventTime, ExistingEvent, MeetingDetails};

const DATE_TIME_FORMAT: &str = "%a %b %-d, %Y %-I:%M %p";
const TIME_FORMAT: &str = "%-I:%M %p";

/// Wall-clock time as written by the backend, ignoring any offset.
fn wall_clock(time: &EventTime) -> Option<NaiveDateTime> {
    let raw = time.date_time.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn with_zone(text: String, zone: &str) -> String {
    if zone.is_empty() {
        text
    } else {
        format!("{} ({})", text, zone)
    }
}

/// Formats a single event time, falling back to the raw string.
pub fn format_event_time(time: &EventTime) -> String {
    let text = match wall_clock(time) {
        Some(dt) => dt.format(DATE_TIME_FORMAT).to_string(),
        None => time.date_time.clone(),
    };
    with_zone(text, &time.time_zone)
}

/// Formats a start/end pair, collapsing the end date when both fall on the same day.
pub fn format_time_range(start: &EventTime, end: &EventTime) -> String {
    match (wall_clock(start), wall_clock(end)) {
        (Some(s), Some(e)) if s.date() == e.date() && start.time_zone == end.time_zone => {
            with_zone(
                format!("{} - {}", s.format(DATE_TIME_FORMAT), e.format(TIME_FORMAT)),
                &start.time_zone,
            )
        }
        _ => format!("{} - {}", format_event_time(start), format_event_time(end)),
    }
}

/// One-line description used inside resolution blocks.
pub fn describe_meeting(meeting: &MeetingDetails) -> String {
    let mut line = format!(
        "\"{}\" on {}",
        meeting.summary,
        format_time_range(&meeting.start, &meeting.end)
    );
    if let Some(location) = meeting.location() {
        line.push_str(&format!(" at {}", location));
    }
    if !meeting.attendees.is_empty() {
        let emails: Vec<&str> = meeting.attendees.iter().map(|a| a.email()).collect();
        line.push_str(&format!(" with {}", emails.join(", ")));
    }
    line
}

/// One-line description of an existing calendar event.
pub fn describe_existing_event(event: &ExistingEvent) -> String {
    let title = if event.summary.trim().is_empty() {
        "(untitled event)"
    } else {
        event.summary.as_str()
    };
    format!(
        "\"{}\" on {}",
        title,
        format_time_range(&event.start, &event.end)
    )
}
