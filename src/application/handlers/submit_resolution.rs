//! SubmitResolutionHandler - Sends the user's resolution to the workflow.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::SharedCycle;
use crate::domain::cycle::CycleError;
use crate::domain::foundation::{CycleId, StreamId};
use crate::domain::resolution::SubmissionCommand;
use crate::ports::WorkflowBackend;

use super::run_fetch_cycle::DEFAULT_MESSAGE_DISPLAY;
use super::stream_driver::{drive_stream, record_transport_error, StreamOutcome};

/// A submission accepted by the cycle and not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub cycle_id: CycleId,
    pub stream_id: StreamId,
    pub thread_id: String,
    pub command: SubmissionCommand,
}

/// Handler for resolution submissions.
#[derive(Clone)]
pub struct SubmitResolutionHandler {
    backend: Arc<dyn WorkflowBackend>,
    cycle: SharedCycle,
    message_display: Duration,
}

impl SubmitResolutionHandler {
    pub fn new(backend: Arc<dyn WorkflowBackend>, cycle: SharedCycle) -> Self {
        Self {
            backend,
            cycle,
            message_display: DEFAULT_MESSAGE_DISPLAY,
        }
    }

    /// Sets how long each progress message holds back the next event.
    pub fn with_message_display(mut self, message_display: Duration) -> Self {
        self.message_display = message_display;
        self
    }

    /// Submits the session and marks the cycle as submitting.
    ///
    /// Validation failures leave the cycle unchanged and make no call to
    /// the workflow service.
    pub async fn start(&self) -> Result<PendingSubmission, CycleError> {
        let mut cycle = self.cycle.write().await;
        let (command, thread_id, stream_id) = cycle.begin_submit()?;
        Ok(PendingSubmission {
            cycle_id: cycle.id(),
            stream_id,
            thread_id,
            command,
        })
    }

    /// Sends a started submission and streams the confirmation.
    pub async fn run(&self, pending: &PendingSubmission) -> StreamOutcome {
        let stream = match self
            .backend
            .schedule_meetings(&pending.thread_id, &pending.command.resolution_text)
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                record_transport_error(&self.cycle, pending.stream_id, &err).await;
                return StreamOutcome::failed(err);
            }
        };

        let outcome =
            drive_stream(&self.cycle, pending.stream_id, stream, self.message_display).await;
        info!(
            cycle_id = %pending.cycle_id,
            frames = outcome.frames_decoded,
            truncated = outcome.truncated,
            "Scheduling stream closed"
        );
        outcome
    }

    /// Submits and waits for the confirmation stream to end.
    pub async fn handle(&self) -> Result<(SubmissionCommand, StreamOutcome), CycleError> {
        let pending = self.start().await?;
        let outcome = self.run(&pending).await;
        Ok((pending.command, outcome))
    }
}
