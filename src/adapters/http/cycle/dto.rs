//! Data Transfer Objects for cycle HTTP endpoints.
//!
//! These types define the JSON request/response shapes for the API.
//! They're separate from domain types to allow independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::cycle::WorkflowCycle;
use crate::domain::foundation::{CycleStatus, MeetingKey};
use crate::domain::meeting::{
    describe_meeting, format_time_range, ConflictGroup, ExistingEvent, MeetingDetails,
    ScheduledMeeting,
};
use crate::domain::resolution::{BlockId, MeetingChoice, ResolutionSession, SubmissionCommand};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for checkbox endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub checked: bool,
}

/// Request body for replacing text.
#[derive(Debug, Clone, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response after starting a scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStartedResponse {
    pub cycle_id: String,
    pub status: CycleStatus,
}

/// Response after submitting a resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub cycle_id: String,
    #[serde(flatten)]
    pub command: SubmissionCommand,
}

/// One proposed meeting with its resolution state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingView {
    pub key: MeetingKey,
    #[serde(flatten)]
    pub details: MeetingDetails,
    /// Human-readable one-line description.
    pub label: String,
    pub time_range: String,
    pub choice: MeetingChoice,
    pub selected: bool,
    pub replace_conflicts: bool,
    pub draft: Option<String>,
    pub conflicts: Vec<ExistingEvent>,
}

/// Everything the UI renders for the current cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleView {
    pub cycle_id: String,
    pub status: CycleStatus,
    pub message: Option<String>,
    pub thread_id: Option<String>,
    /// Meetings announced before the scan finished.
    pub preview: Vec<MeetingDetails>,
    pub meetings: Vec<MeetingView>,
    pub conflicting_events: Vec<ConflictGroup>,
    pub select_all: bool,
    pub resolution_text: String,
    pub detached_blocks: Vec<BlockId>,
    pub scheduled: Vec<ScheduledMeeting>,
    pub warnings: Vec<String>,
    pub last_error: Option<String>,
    pub updated_at: String,
}

impl CycleView {
    pub fn from_cycle(cycle: &WorkflowCycle) -> Self {
        let session = cycle.session();
        Self {
            cycle_id: cycle.id().to_string(),
            status: cycle.status(),
            message: cycle.message().map(str::to_string),
            thread_id: cycle.thread_id().map(str::to_string),
            preview: cycle.preview().to_vec(),
            meetings: session.map(meeting_views).unwrap_or_default(),
            conflicting_events: session
                .map(|s| s.snapshot().conflicting_events().to_vec())
                .unwrap_or_default(),
            select_all: session.is_some_and(ResolutionSession::is_all_selected),
            resolution_text: session
                .map(ResolutionSession::resolution_text)
                .unwrap_or_default(),
            detached_blocks: session
                .map(|s| s.document().detached_blocks().to_vec())
                .unwrap_or_default(),
            scheduled: cycle.scheduled().to_vec(),
            warnings: cycle.warnings().to_vec(),
            last_error: cycle.last_error().map(str::to_string),
            updated_at: cycle.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

fn meeting_views(session: &ResolutionSession) -> Vec<MeetingView> {
    let snapshot = session.snapshot();
    snapshot
        .new_meetings()
        .iter()
        .map(|meeting| {
            let choice = session.choice(meeting.key).cloned().unwrap_or_default();
            MeetingView {
                key: meeting.key,
                details: meeting.details.clone(),
                label: describe_meeting(&meeting.details),
                time_range: format_time_range(&meeting.details.start, &meeting.details.end),
                selected: choice.is_selected(),
                replace_conflicts: choice.is_replacing(),
                draft: choice.draft().map(str::to_string),
                choice,
                conflicts: snapshot
                    .conflicts_for(meeting.key)
                    .map(|group| group.existing_events.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
