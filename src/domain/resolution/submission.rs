//! Command emitted when the user submits their resolution.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::MeetingKey;

/// Selected meetings plus the resolution text describing how to handle them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCommand {
    pub selected_keys: Vec<MeetingKey>,
    pub resolution_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_wire_shape() {
        let key = MeetingKey::new();
        let cmd = SubmissionCommand {
            selected_keys: vec![key],
            resolution_text: "Schedule all.".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"selectedKeys": [key.to_string()], "resolutionText": "Schedule all."})
        );
    }
}
