//! Meetings proposed by the workflow and the calendar entries they conflict with.

mod format;
mod meeting;
mod snapshot;

pub use format::{describe_existing_event, describe_meeting, format_event_time, format_time_range};
pub use meeting::{Attendee, EventTime, ExistingEvent, Meeting, MeetingDetails, ScheduledMeeting};
pub use snapshot::{ConflictGroup, WorkflowSnapshot};
