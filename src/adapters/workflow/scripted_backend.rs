//! Scripted Workflow Backend for tests and demos.
//!
//! Replays pre-configured responses instead of calling the workflow
//! service. Each call to [`WorkflowBackend::fetch_meetings`] or
//! [`WorkflowBackend::schedule_meetings`] consumes the next script queued
//! for it.
//!
//! # Example
//!
//! ```ignore
//! let backend = ScriptedWorkflowBackend::new()
//!     .with_fetch(Script::from_events(&[
//!         json!({"type": "thread_id", "content": "t-1"}),
//!         json!({"type": "final", "data": {"events_to_schedule": {"meetings": []}}}),
//!     ]).with_chunk_size(7));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::stream::FRAME_DELIMITER;
use crate::ports::{BackendError, EventByteStream, WorkflowBackend};

/// One step of a scripted response body.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Deliver these bytes as one chunk.
    Chunk(Vec<u8>),
    /// Wait before the next step.
    Pause(Duration),
    /// Break the body stream with this error.
    Fail(BackendError),
}

/// A scripted response: either an immediate error or a body.
#[derive(Debug, Clone)]
pub struct Script {
    reject: Option<BackendError>,
    steps: Vec<ScriptStep>,
}

impl Script {
    /// A body delivering `bytes` in a single chunk.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reject: None,
            steps: vec![ScriptStep::Chunk(bytes.into())],
        }
    }

    /// A body carrying `events` framed the way the workflow service frames
    /// them: pretty-printed JSON followed by a blank line.
    pub fn from_events(events: &[Value]) -> Self {
        Self::from_bytes(encode_frames(events))
    }

    /// A call that fails before any body is produced.
    pub fn rejected(error: BackendError) -> Self {
        Self {
            reject: Some(error),
            steps: Vec::new(),
        }
    }

    /// Re-splits every chunk into pieces of at most `size` bytes.
    ///
    /// Splits ignore frame and UTF-8 boundaries.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        let size = size.max(1);
        self.steps = self
            .steps
            .into_iter()
            .flat_map(|step| match step {
                ScriptStep::Chunk(bytes) => bytes
                    .chunks(size)
                    .map(|piece| ScriptStep::Chunk(piece.to_vec()))
                    .collect::<Vec<_>>(),
                other => vec![other],
            })
            .collect();
        self
    }

    /// Appends more body bytes.
    pub fn then_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push(ScriptStep::Chunk(bytes.into()));
        self
    }

    /// Appends a pause.
    pub fn then_pause(mut self, pause: Duration) -> Self {
        self.steps.push(ScriptStep::Pause(pause));
        self
    }

    /// Appends a transport failure.
    pub fn then_fail(mut self, error: BackendError) -> Self {
        self.steps.push(ScriptStep::Fail(error));
        self
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    fn into_stream(self) -> Result<EventByteStream, BackendError> {
        if let Some(error) = self.reject {
            return Err(error);
        }
        let stream = stream::iter(self.steps).filter_map(|step| async move {
            match step {
                ScriptStep::Chunk(bytes) => Some(Ok(bytes)),
                ScriptStep::Pause(pause) => {
                    sleep(pause).await;
                    None
                }
                ScriptStep::Fail(error) => Some(Err(error)),
            }
        });
        Ok(Box::pin(stream))
    }
}

/// Frames events the way the workflow service does.
pub fn encode_frames(events: &[Value]) -> Vec<u8> {
    let mut body = String::new();
    for event in events {
        body.push_str(&serde_json::to_string_pretty(event).unwrap_or_else(|_| event.to_string()));
        body.push_str(FRAME_DELIMITER);
    }
    body.into_bytes()
}

/// A recorded `schedule_meetings` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCall {
    pub thread_id: String,
    pub resolution_text: String,
}

/// Workflow backend that replays queued scripts.
///
/// An exhausted queue answers with an empty body.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWorkflowBackend {
    fetch_scripts: Arc<Mutex<VecDeque<Script>>>,
    schedule_scripts: Arc<Mutex<VecDeque<Script>>>,
    fetch_calls: Arc<Mutex<usize>>,
    schedule_calls: Arc<Mutex<Vec<ScheduleCall>>>,
}

/// Locks ignoring poisoning; the guarded data stays consistent on panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedWorkflowBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next scan.
    pub fn with_fetch(self, script: Script) -> Self {
        self.push_fetch(script);
        self
    }

    /// Queues a response for the next schedule call.
    pub fn with_schedule(self, script: Script) -> Self {
        self.push_schedule(script);
        self
    }

    pub fn push_fetch(&self, script: Script) {
        lock(&self.fetch_scripts).push_back(script);
    }

    pub fn push_schedule(&self, script: Script) {
        lock(&self.schedule_scripts).push_back(script);
    }

    /// Number of scans started.
    pub fn fetch_count(&self) -> usize {
        *lock(&self.fetch_calls)
    }

    /// Every schedule call received, in order.
    pub fn schedule_calls(&self) -> Vec<ScheduleCall> {
        lock(&self.schedule_calls).clone()
    }
}

#[async_trait]
impl WorkflowBackend for ScriptedWorkflowBackend {
    async fn fetch_meetings(&self) -> Result<EventByteStream, BackendError> {
        *lock(&self.fetch_calls) += 1;
        let script = lock(&self.fetch_scripts)
            .pop_front()
            .unwrap_or_else(|| Script::from_bytes(Vec::new()));
        script.into_stream()
    }

    async fn schedule_meetings(
        &self,
        thread_id: &str,
        resolution_text: &str,
    ) -> Result<EventByteStream, BackendError> {
        lock(&self.schedule_calls).push(ScheduleCall {
            thread_id: thread_id.to_string(),
            resolution_text: resolution_text.to_string(),
        });
        let script = lock(&self.schedule_scripts)
            .pop_front()
            .unwrap_or_else(|| Script::from_bytes(Vec::new()));
        script.into_stream()
    }
}
