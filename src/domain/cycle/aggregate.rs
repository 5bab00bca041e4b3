//! WorkflowCycle aggregate - one fetch, resolve and schedule round trip.
//!
//! The cycle applies decoded stream events in order and owns the
//! [`ResolutionSession`] built from the scan result. It never touches the
//! network; handlers feed it events and report how the stream ended.

use tracing::{debug, info, warn};

use crate::domain::foundation::{CycleId, CycleStatus, StateMachine, StreamId, Timestamp};
use crate::domain::meeting::{MeetingDetails, ScheduledMeeting, WorkflowSnapshot};
use crate::domain::resolution::{ResolutionSession, SubmissionCommand};
use crate::domain::stream::{StreamError, StreamEvent};

use super::CycleError;

/// The WorkflowCycle aggregate root.
#[derive(Debug, Clone)]
pub struct WorkflowCycle {
    id: CycleId,
    status: CycleStatus,
    /// The stream whose events the cycle accepts. Opening a new stream
    /// leaves any older one stale, even if it is still delivering frames.
    stream: Option<StreamId>,
    thread_id: Option<String>,
    /// Latest progress text; replaced by each `message` event and cleared
    /// once the stream reaches its outcome.
    message: Option<String>,
    /// Meetings announced by `events_to_schedule` before the scan finished.
    preview: Vec<MeetingDetails>,
    session: Option<ResolutionSession>,
    scheduled: Vec<ScheduledMeeting>,
    warnings: Vec<String>,
    last_error: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Default for WorkflowCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowCycle {
    /// Creates an idle cycle.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            id: CycleId::new(),
            status: CycleStatus::Idle,
            stream: None,
            thread_id: None,
            message: None,
            preview: Vec::new(),
            session: None,
            scheduled: Vec::new(),
            warnings: Vec::new(),
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    /// Whether `stream` is the one the cycle is listening to.
    pub fn is_current_stream(&self, stream: StreamId) -> bool {
        self.stream == Some(stream)
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn preview(&self) -> &[MeetingDetails] {
        &self.preview
    }

    pub fn session(&self) -> Option<&ResolutionSession> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> Option<&WorkflowSnapshot> {
        self.session.as_ref().map(ResolutionSession::snapshot)
    }

    pub fn scheduled(&self) -> &[ScheduledMeeting] {
        &self.scheduled
    }

    /// Non-fatal problems seen while streaming, oldest first.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Why the last stream failed, if it did.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ───────────────────────────────────────────────────────────────
    // Scan
    // ───────────────────────────────────────────────────────────────

    /// Starts a new scan, discarding everything from the previous one.
    ///
    /// Rejected while a stream is running. Returns the id of the scan
    /// stream; frames from any earlier stream are ignored from now on.
    pub fn begin_fetch(&mut self) -> Result<StreamId, CycleError> {
        if self.status.is_streaming() {
            return Err(CycleError::AlreadyRunning(self.status));
        }
        self.transition(CycleStatus::Fetching);

        self.id = CycleId::new();
        let stream = StreamId::new();
        self.stream = Some(stream);
        self.thread_id = None;
        self.message = None;
        self.preview.clear();
        self.session = None;
        self.scheduled.clear();
        self.warnings.clear();
        self.last_error = None;
        self.created_at = Timestamp::now();

        info!(cycle_id = %self.id, %stream, "Meeting scan started");
        Ok(stream)
    }

    /// Applies one decoded event.
    ///
    /// Events that make no sense in the current status are logged and
    /// recorded as warnings.
    pub fn apply_event(&mut self, event: StreamEvent) {
        self.updated_at = Timestamp::now();
        match (self.status, event) {
            (_, StreamEvent::Message { content }) => {
                debug!(message = %content, "Workflow progress");
                self.message = Some(content);
            }
            (CycleStatus::Fetching, StreamEvent::ThreadId { content }) => {
                debug!(thread_id = %content, "Workflow thread assigned");
                self.thread_id = Some(content);
            }
            (CycleStatus::Fetching, StreamEvent::EventsToSchedule { data }) => {
                debug!(meetings = data.meetings.len(), "Meetings found so far");
                self.preview = data.meetings;
            }
            (CycleStatus::Fetching, StreamEvent::Final { data }) => {
                let snapshot = WorkflowSnapshot::from_final(data);
                info!(
                    cycle_id = %self.id,
                    meetings = snapshot.new_meetings().len(),
                    conflicts = snapshot.conflicting_events().len(),
                    "Meeting scan finished"
                );
                self.session = Some(ResolutionSession::new(snapshot));
                self.message = None;
                self.transition(CycleStatus::AwaitingResolution);
            }
            (CycleStatus::AwaitingResolution, StreamEvent::Final { .. }) => {
                debug!("Ignoring repeated final event");
            }
            (CycleStatus::Submitting, StreamEvent::MeetingsScheduled { data }) => {
                info!(cycle_id = %self.id, meetings = data.meetings.len(), "Meetings scheduled");
                self.scheduled = data.meetings;
                self.message = None;
                self.transition(CycleStatus::Scheduled);
            }
            (CycleStatus::Fetching | CycleStatus::Submitting, StreamEvent::Error { data }) => {
                self.fail(format!("workflow failed: {}", data));
            }
            (status, event) => {
                warn!(%status, kind = event.kind(), "Ignoring unexpected stream event");
                self.warnings
                    .push(format!("ignored '{}' event while {}", event.kind(), status));
            }
        }
    }

    /// Records a non-fatal problem, such as a skipped malformed frame.
    pub fn record_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
        self.updated_at = Timestamp::now();
    }

    /// Records how a stream ended.
    ///
    /// A truncated tail becomes a warning. A stream that ended before its
    /// terminal event fails the scan, or reopens the resolution after a
    /// submission. Reports from a stale stream change nothing.
    pub fn finish_stream(&mut self, stream: StreamId, outcome: Result<(), StreamError>) {
        if !self.is_current_stream(stream) {
            debug!(%stream, "Ignoring end of stale stream");
            return;
        }
        self.stream = None;
        if let Err(err) = outcome {
            self.record_warning(err.to_string());
        }
        match self.status {
            CycleStatus::Fetching => self.fail("stream ended before the scan finished"),
            CycleStatus::Submitting => self.fail("stream ended before scheduling was confirmed"),
            _ => {}
        }
    }

    /// Ends `stream` with an error, unless a newer stream replaced it.
    pub fn fail_stream(&mut self, stream: StreamId, reason: impl Into<String>) {
        if !self.is_current_stream(stream) {
            debug!(%stream, "Ignoring failure of stale stream");
            return;
        }
        self.stream = None;
        self.fail(reason);
    }

    /// A failed scan leaves the cycle Failed. A failed submission returns to
    /// awaiting resolution with selections intact so it can be retried.
    fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        match self.status {
            CycleStatus::Fetching => {
                warn!(cycle_id = %self.id, %reason, "Meeting scan failed");
                self.transition(CycleStatus::Failed);
            }
            CycleStatus::Submitting => {
                warn!(cycle_id = %self.id, %reason, "Scheduling failed");
                self.transition(CycleStatus::AwaitingResolution);
            }
            status => {
                debug!(%status, %reason, "No stream running; ignoring failure");
                return;
            }
        }
        self.last_error = Some(reason);
        self.message = None;
        self.updated_at = Timestamp::now();
    }

    // ───────────────────────────────────────────────────────────────
    // Resolution
    // ───────────────────────────────────────────────────────────────

    /// The session, if the user may change it now.
    pub fn session_mut(&mut self) -> Result<&mut ResolutionSession, CycleError> {
        if !self.status.accepts_resolution() {
            return Err(match self.session {
                None => CycleError::NoSnapshot,
                Some(_) => CycleError::ResolutionClosed(self.status),
            });
        }
        self.updated_at = Timestamp::now();
        self.session.as_mut().ok_or(CycleError::NoSnapshot)
    }

    /// Submits the resolution and starts waiting for the confirmation.
    ///
    /// Returns the command, the thread id to send it to and the id of the
    /// confirmation stream. A scan stream still open at this point goes
    /// stale. Nothing changes if the session rejects the submission.
    pub fn begin_submit(
        &mut self,
    ) -> Result<(SubmissionCommand, String, StreamId), CycleError> {
        let thread_id = match (&self.thread_id, self.status) {
            (_, status) if status.is_streaming() => return Err(CycleError::AlreadyRunning(status)),
            (None, CycleStatus::AwaitingResolution) => return Err(CycleError::NoThreadId),
            (Some(thread_id), _) => thread_id.clone(),
            (None, _) => return Err(CycleError::NoSnapshot),
        };
        let command = self.session_mut()?.submit()?;
        let stream = StreamId::new();
        self.stream = Some(stream);
        self.last_error = None;
        self.message = None;
        self.transition(CycleStatus::Submitting);
        info!(
            cycle_id = %self.id,
            %stream,
            selected = command.selected_keys.len(),
            "Resolution submitted"
        );
        Ok((command, thread_id, stream))
    }

    fn transition(&mut self, target: CycleStatus) {
        match self.status.transition_to(target) {
            Ok(next) => {
                debug!(from = %self.status, to = %next, "Cycle status changed");
                self.status = next;
                self.updated_at = Timestamp::now();
            }
            Err(err) => warn!(error = %err, "Rejected cycle status change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meeting::EventTime;
    use crate::domain::resolution::ResolutionError;
    use crate::domain::stream::{FinalPayload, MeetingList, ScheduledMeetingList};

    fn sync() -> MeetingDetails {
        MeetingDetails {
            summary: "Sync".to_string(),
            start: EventTime::new("2024-03-20T10:00:00Z", "UTC"),
            end: EventTime::new("2024-03-20T10:30:00Z", "UTC"),
            location: None,
            attendees: vec![],
        }
    }

    fn final_event() -> StreamEvent {
        StreamEvent::Final {
            data: FinalPayload {
                events_to_schedule: Some(MeetingList {
                    meetings: vec![sync()],
                }),
                conflicting_events: None,
            },
        }
    }

    fn scanned() -> (WorkflowCycle, StreamId) {
        let mut cycle = WorkflowCycle::new();
        let scan = cycle.begin_fetch().unwrap();
        cycle.apply_event(StreamEvent::ThreadId {
            content: "t1".to_string(),
        });
        cycle.apply_event(final_event());
        (cycle, scan)
    }

    fn awaiting() -> WorkflowCycle {
        scanned().0
    }

    #[test]
    fn new_cycle_is_idle() {
        let cycle = WorkflowCycle::new();
        assert_eq!(cycle.status(), CycleStatus::Idle);
        assert!(cycle.session().is_none());
    }

    #[test]
    fn scan_events_build_session() {
        let mut cycle = WorkflowCycle::new();
        cycle.begin_fetch().unwrap();
        cycle.apply_event(StreamEvent::ThreadId {
            content: "t1".to_string(),
        });
        cycle.apply_event(StreamEvent::Message {
            content: "Scanning inbox".to_string(),
        });
        cycle.apply_event(StreamEvent::EventsToSchedule {
            data: MeetingList {
                meetings: vec![sync()],
            },
        });
        assert_eq!(cycle.message(), Some("Scanning inbox"));
        assert_eq!(cycle.preview().len(), 1);

        cycle.apply_event(final_event());
        assert_eq!(cycle.status(), CycleStatus::AwaitingResolution);
        assert_eq!(cycle.message(), None);
        assert_eq!(cycle.thread_id(), Some("t1"));
        let snapshot = cycle.snapshot().unwrap();
        assert_eq!(snapshot.new_meetings()[0].summary(), "Sync");
        assert!(snapshot.conflicting_events().is_empty());
    }

    #[test]
    fn concurrent_fetch_is_rejected() {
        let mut cycle = WorkflowCycle::new();
        let stream = cycle.begin_fetch().unwrap();
        let id = cycle.id();
        assert_eq!(
            cycle.begin_fetch(),
            Err(CycleError::AlreadyRunning(CycleStatus::Fetching))
        );
        assert_eq!(cycle.id(), id);
        assert!(cycle.is_current_stream(stream));
    }

    #[test]
    fn new_fetch_resets_selection() {
        let mut cycle = awaiting();
        cycle.session_mut().unwrap().toggle_select_all(true);
        cycle.begin_fetch().unwrap();
        assert!(cycle.session().is_none());
        assert!(cycle.thread_id().is_none());
    }

    #[test]
    fn error_event_fails_the_scan() {
        let mut cycle = WorkflowCycle::new();
        cycle.begin_fetch().unwrap();
        cycle.apply_event(StreamEvent::Error {
            data: "calendar unavailable".to_string(),
        });
        assert_eq!(cycle.status(), CycleStatus::Failed);
        assert_eq!(cycle.last_error(), Some("workflow failed: calendar unavailable"));
    }

    #[test]
    fn stream_without_final_fails_and_keeps_truncation_warning() {
        let mut cycle = WorkflowCycle::new();
        let scan = cycle.begin_fetch().unwrap();
        cycle.finish_stream(scan, Err(StreamError::Truncated {
            bytes: 4,
            preview: "{\"ty".to_string(),
        }));
        assert_eq!(cycle.status(), CycleStatus::Failed);
        assert_eq!(cycle.warnings().len(), 1);
    }

    #[test]
    fn truncated_tail_after_final_is_only_a_warning() {
        let (mut cycle, scan) = scanned();
        cycle.finish_stream(scan, Err(StreamError::Truncated {
            bytes: 3,
            preview: "{\"t".to_string(),
        }));
        assert_eq!(cycle.status(), CycleStatus::AwaitingResolution);
        assert_eq!(cycle.warnings().len(), 1);
        assert!(cycle.snapshot().is_some());
    }

    #[test]
    fn resolution_is_closed_before_scan_finishes() {
        let mut cycle = WorkflowCycle::new();
        assert_eq!(cycle.session_mut().err(), Some(CycleError::NoSnapshot));
        cycle.begin_fetch().unwrap();
        assert_eq!(cycle.session_mut().err(), Some(CycleError::NoSnapshot));
    }

    #[test]
    fn empty_submission_changes_nothing() {
        let mut cycle = awaiting();
        assert_eq!(
            cycle.begin_submit(),
            Err(CycleError::Resolution(ResolutionError::EmptySelection))
        );
        assert_eq!(cycle.status(), CycleStatus::AwaitingResolution);
    }

    #[test]
    fn submission_round_trip() {
        let mut cycle = awaiting();
        cycle.session_mut().unwrap().toggle_select_all(true);
        let (command, thread_id, _) = cycle.begin_submit().unwrap();
        assert_eq!(thread_id, "t1");
        assert_eq!(command.selected_keys.len(), 1);
        assert_eq!(cycle.status(), CycleStatus::Submitting);
        assert_eq!(
            cycle.session_mut().err(),
            Some(CycleError::ResolutionClosed(CycleStatus::Submitting))
        );

        cycle.apply_event(StreamEvent::MeetingsScheduled {
            data: ScheduledMeetingList::default(),
        });
        assert_eq!(cycle.status(), CycleStatus::Scheduled);
    }

    #[test]
    fn failed_submission_reopens_resolution() {
        let mut cycle = awaiting();
        cycle.session_mut().unwrap().toggle_select_all(true);
        let (_, _, confirmation) = cycle.begin_submit().unwrap();
        cycle.fail_stream(confirmation, "network error: reset");

        assert_eq!(cycle.status(), CycleStatus::AwaitingResolution);
        assert_eq!(cycle.last_error(), Some("network error: reset"));
        assert_eq!(cycle.session().unwrap().selected_keys().len(), 1);
    }

    #[test]
    fn missing_thread_id_blocks_submission() {
        let mut cycle = WorkflowCycle::new();
        cycle.begin_fetch().unwrap();
        cycle.apply_event(final_event());
        cycle.session_mut().unwrap().toggle_select_all(true);
        assert_eq!(cycle.begin_submit(), Err(CycleError::NoThreadId));
    }

    #[test]
    fn unexpected_event_becomes_warning() {
        let mut cycle = awaiting();
        cycle.apply_event(StreamEvent::MeetingsScheduled {
            data: ScheduledMeetingList::default(),
        });
        assert_eq!(cycle.status(), CycleStatus::AwaitingResolution);
        assert_eq!(
            cycle.warnings(),
            ["ignored 'meetings_scheduled' event while Awaiting resolution".to_string()]
        );
    }

    #[test]
    fn repeated_final_is_ignored_quietly() {
        let mut cycle = awaiting();
        let key = cycle.snapshot().unwrap().new_meetings()[0].key;
        cycle.apply_event(final_event());
        assert!(cycle.warnings().is_empty());
        assert_eq!(cycle.snapshot().unwrap().new_meetings()[0].key, key);
    }

    #[test]
    fn submission_makes_the_scan_stream_stale() {
        let (mut cycle, scan) = scanned();
        cycle.session_mut().unwrap().toggle_select_all(true);
        let (_, _, confirmation) = cycle.begin_submit().unwrap();
        assert!(!cycle.is_current_stream(scan));

        cycle.finish_stream(scan, Ok(()));
        cycle.fail_stream(scan, "network error: reset");
        assert_eq!(cycle.status(), CycleStatus::Submitting);
        assert_eq!(cycle.last_error(), None);

        cycle.apply_event(StreamEvent::MeetingsScheduled {
            data: ScheduledMeetingList::default(),
        });
        cycle.finish_stream(confirmation, Ok(()));
        assert_eq!(cycle.status(), CycleStatus::Scheduled);
        assert!(cycle.warnings().is_empty());
    }

    #[test]
    fn message_is_cleared_when_the_stream_reaches_its_outcome() {
        let mut cycle = awaiting();
        cycle.apply_event(StreamEvent::Message {
            content: "Still here".to_string(),
        });
        cycle.session_mut().unwrap().toggle_select_all(true);
        let (_, _, confirmation) = cycle.begin_submit().unwrap();
        assert_eq!(cycle.message(), None);

        cycle.apply_event(StreamEvent::Message {
            content: "Booking meetings".to_string(),
        });
        assert_eq!(cycle.message(), Some("Booking meetings"));
        cycle.fail_stream(confirmation, "network error: reset");
        assert_eq!(cycle.message(), None);
    }
}
