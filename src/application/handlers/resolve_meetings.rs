//! ResolveMeetingsHandler - User actions on the current resolution.
//!
//! Each action is applied under the cycle's write lock, so actions never
//! interleave with each other or with stream events.

use tracing::debug;

use crate::application::SharedCycle;
use crate::domain::cycle::CycleError;
use crate::domain::foundation::MeetingKey;
use crate::domain::resolution::BlockId;

/// Handler for selection toggles, drafts and document edits.
#[derive(Clone)]
pub struct ResolveMeetingsHandler {
    cycle: SharedCycle,
}

impl ResolveMeetingsHandler {
    pub fn new(cycle: SharedCycle) -> Self {
        Self { cycle }
    }

    pub async fn toggle_select_all(&self, checked: bool) -> Result<(), CycleError> {
        let mut cycle = self.cycle.write().await;
        cycle.session_mut()?.toggle_select_all(checked);
        Ok(())
    }

    pub async fn toggle_meeting_selected(
        &self,
        key: MeetingKey,
        checked: bool,
    ) -> Result<(), CycleError> {
        let mut cycle = self.cycle.write().await;
        Ok(cycle.session_mut()?.toggle_meeting_selected(key, checked)?)
    }

    pub async fn toggle_replace_conflicting(
        &self,
        key: MeetingKey,
        checked: bool,
    ) -> Result<(), CycleError> {
        let mut cycle = self.cycle.write().await;
        Ok(cycle.session_mut()?.toggle_replace_conflicting(key, checked)?)
    }

    pub async fn set_draft(&self, key: MeetingKey, text: String) -> Result<(), CycleError> {
        let mut cycle = self.cycle.write().await;
        Ok(cycle.session_mut()?.set_draft(key, text)?)
    }

    /// Replaces the document with hand-edited text.
    ///
    /// Returns the blocks the edit detached from their toggles.
    pub async fn edit_document(&self, text: &str) -> Result<Vec<BlockId>, CycleError> {
        let mut cycle = self.cycle.write().await;
        let detached = cycle.session_mut()?.edit_document(text);
        if !detached.is_empty() {
            debug!(count = detached.len(), "Hand edit detached generated blocks");
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resolution::ResolutionError;
    use crate::domain::stream::{parse_frame, StreamEvent};

    async fn awaiting() -> (ResolveMeetingsHandler, SharedCycle, MeetingKey) {
        let cycle = SharedCycle::new();
        {
            let mut current = cycle.write().await;
            current.begin_fetch().unwrap();
            current.apply_event(StreamEvent::ThreadId {
                content: "t1".to_string(),
            });
            let event = parse_frame(
                r#"{"type": "final", "data": {"events_to_schedule": {"meetings": [{
                    "summary": "Sync",
                    "start": {"dateTime": "2024-03-20T10:00:00", "timeZone": "UTC"},
                    "end": {"dateTime": "2024-03-20T10:30:00", "timeZone": "UTC"},
                    "attendees": []
                }]}, "conflicting_events": null}}"#,
            )
            .unwrap();
            current.apply_event(event);
        }
        let key = cycle.read().await.snapshot().unwrap().new_meetings()[0].key;
        (ResolveMeetingsHandler::new(cycle.clone()), cycle, key)
    }

    #[tokio::test]
    async fn actions_before_scan_are_rejected() {
        let handler = ResolveMeetingsHandler::new(SharedCycle::new());
        assert_eq!(
            handler.toggle_select_all(true).await,
            Err(CycleError::NoSnapshot)
        );
    }

    #[tokio::test]
    async fn toggles_update_the_session() {
        let (handler, cycle, key) = awaiting().await;
        handler.toggle_meeting_selected(key, true).await.unwrap();
        handler.set_draft(key, "after lunch".to_string()).await.unwrap();

        let cycle = cycle.read().await;
        let session = cycle.session().unwrap();
        assert!(session.is_selected(key));
        assert_eq!(session.draft(key), Some("after lunch"));
    }

    #[tokio::test]
    async fn session_errors_pass_through() {
        let (handler, _, key) = awaiting().await;
        assert_eq!(
            handler.toggle_replace_conflicting(key, true).await,
            Err(CycleError::Resolution(ResolutionError::MeetingNotSelected(key)))
        );
    }

    #[tokio::test]
    async fn edit_reports_detached_blocks() {
        let (handler, _, key) = awaiting().await;
        handler.toggle_meeting_selected(key, true).await.unwrap();

        let detached = handler.edit_document("something else entirely").await.unwrap();
        assert_eq!(detached, vec![BlockId::schedule(key)]);
    }
}
