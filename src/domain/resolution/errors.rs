//! Resolution errors.

use thiserror::Error;

use crate::domain::foundation::MeetingKey;

/// A user action that was rejected without changing any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("meeting {0} is not part of this scan")]
    UnknownMeeting(MeetingKey),

    #[error("meeting {0} is not selected")]
    MeetingNotSelected(MeetingKey),

    #[error("meeting {0} has no conflicting events to replace")]
    NoConflicts(MeetingKey),

    #[error("draft for meeting {key} is unavailable: {reason}")]
    DraftUnavailable { key: MeetingKey, reason: &'static str },

    #[error("select at least one meeting")]
    EmptySelection,
}

impl ResolutionError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::UnknownMeeting(_) => "UNKNOWN_MEETING",
            ResolutionError::MeetingNotSelected(_) => "MEETING_NOT_SELECTED",
            ResolutionError::NoConflicts(_) => "NO_CONFLICTS",
            ResolutionError::DraftUnavailable { .. } => "DRAFT_UNAVAILABLE",
            ResolutionError::EmptySelection => "EMPTY_SELECTION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_message_is_user_facing() {
        assert_eq!(ResolutionError::EmptySelection.to_string(), "select at least one meeting");
        assert_eq!(ResolutionError::EmptySelection.code(), "EMPTY_SELECTION");
    }
}
