//! RunFetchCycleHandler - Starts a meeting scan and streams its result.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::SharedCycle;
use crate::domain::cycle::CycleError;
use crate::domain::foundation::{CycleId, StreamId};
use crate::ports::WorkflowBackend;

use super::stream_driver::{drive_stream, record_transport_error, StreamOutcome};

/// Default minimum time a progress message stays visible.
pub const DEFAULT_MESSAGE_DISPLAY: Duration = Duration::from_millis(2000);

/// A scan claimed on the cycle and not yet streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingScan {
    pub cycle_id: CycleId,
    pub stream_id: StreamId,
}

/// Handler for meeting scans.
#[derive(Clone)]
pub struct RunFetchCycleHandler {
    backend: Arc<dyn WorkflowBackend>,
    cycle: SharedCycle,
    message_display: Duration,
}

impl RunFetchCycleHandler {
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

    /// Claims the cycle for a new scan.
    ///
    /// Fails with [`CycleError::AlreadyRunning`] while another stream is
    /// active; the running cycle is left untouched.
    pub async fn start(&self) -> Result<PendingScan, CycleError> {
        let mut cycle = self.cycle.write().await;
        let stream_id = cycle.begin_fetch()?;
        Ok(PendingScan {
            cycle_id: cycle.id(),
            stream_id,
        })
    }

    /// Streams the scan for a cycle claimed by [`start`](Self::start).
    ///
    /// Never fails: transport errors end the cycle as Failed and are
    /// reported in the outcome.
    pub async fn run(&self, scan: PendingScan) -> StreamOutcome {
        let stream = match self.backend.fetch_meetings().await {
            Ok(stream) => stream,
            Err(err) => {
                record_transport_error(&self.cycle, scan.stream_id, &err).await;
                return StreamOutcome::failed(err);
            }
        };

        let outcome =
            drive_stream(&self.cycle, scan.stream_id, stream, self.message_display).await;
        info!(
            cycle_id = %scan.cycle_id,
            superseded = outcome.superseded,
            frames = outcome.frames_decoded,
            rejected = outcome.frames_rejected,
            truncated = outcome.truncated,
            "Meeting scan stream closed"
        );
        outcome
    }

    /// Starts a scan and waits for its stream to end.
    pub async fn handle(&self) -> Result<StreamOutcome, CycleError> {
        let scan = self.start().await?;
        Ok(self.run(scan).await)
    }
}
