//! Workflow Backend Port - Interface to the scheduling workflow service.
//!
//! The backend scans the inbox for meeting requests, checks them against the
//! calendar and later books the meetings the user approved. Both calls answer
//! with a long-lived stream of blank-line separated JSON frames; this port
//! hands those bytes over untouched so the domain decoder owns framing.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct CannedBackend;
//!
//! #[async_trait]
//! impl WorkflowBackend for CannedBackend {
//!     async fn fetch_meetings(&self) -> Result<EventByteStream, BackendError> {
//!         let frame = br#"{"type":"message","content":"hi"}"#.to_vec();
//!         Ok(Box::pin(futures::stream::iter(vec![Ok(frame)])))
//!     }
//!     // ... schedule_meetings
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Raw response body chunks, in arrival order.
pub type EventByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, BackendError>> + Send>>;

/// Port for the meeting workflow service.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Starts a scan of the inbox and calendar.
    ///
    /// The stream carries `thread_id`, `message`, `events_to_schedule` and
    /// finally `final` (or `error`) frames.
    async fn fetch_meetings(&self) -> Result<EventByteStream, BackendError>;

    /// Sends the user's resolution for the thread returned by the scan.
    ///
    /// The stream carries `meetings_scheduled` (or `error`).
    async fn schedule_meetings(
        &self,
        thread_id: &str,
        resolution_text: &str,
    ) -> Result<EventByteStream, BackendError>;
}

/// Errors from talking to the workflow service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection failed or the body stream broke.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Service answered with a non-success status.
    #[error("workflow service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Returns true if trying the same call again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Network(_) | BackendError::Timeout { .. } => true,
            BackendError::Status { status, .. } => *status >= 500,
            BackendError::InvalidRequest(_) => false,
        }
    }
}
