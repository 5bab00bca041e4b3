//! Per-meeting resolution choice.

use serde::Serialize;

/// How the user wants one proposed meeting handled.
///
/// Selection, replace-conflicts and the free-text draft are one value, so
/// a draft or replace flag cannot outlive the selection it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "draft", rename_all = "snake_case")]
pub enum MeetingChoice {
    #[default]
    Unselected,
    /// Selected; schedule as proposed.
    Scheduled,
    /// Selected; replace the overlapping calendar entries.
    ReplaceConflicts,
    /// Selected with pending free-text instructions.
    CustomText(String),
}

impl MeetingChoice {
    pub fn is_selected(&self) -> bool {
        !matches!(self, MeetingChoice::Unselected)
    }

    pub fn is_replacing(&self) -> bool {
        matches!(self, MeetingChoice::ReplaceConflicts)
    }

    /// Pending draft text, if any.
    pub fn draft(&self) -> Option<&str> {
        match self {
            MeetingChoice::CustomText(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_unselected() {
        assert!(!MeetingChoice::default().is_selected());
    }

    #[test]
    fn selection_projection() {
        assert!(MeetingChoice::Scheduled.is_selected());
        assert!(MeetingChoice::ReplaceConflicts.is_selected());
        assert!(MeetingChoice::CustomText("x".into()).is_selected());
        assert!(MeetingChoice::ReplaceConflicts.is_replacing());
        assert_eq!(MeetingChoice::CustomText("x".into()).draft(), Some("x"));
        assert_eq!(MeetingChoice::Scheduled.draft(), None);
    }

    #[test]
    fn serializes_with_state_tag() {
        assert_eq!(
            serde_json::to_value(MeetingChoice::Scheduled).unwrap(),
            json!({"state": "scheduled"})
        );
        assert_eq!(
            serde_json::to_value(MeetingChoice::CustomText("later".into())).unwrap(),
            json!({"state": "custom_text", "draft": "later"})
        );
    }
}
