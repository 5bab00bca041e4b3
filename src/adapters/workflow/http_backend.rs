//! HTTP Workflow Backend - Implementation of WorkflowBackend over reqwest.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpBackendConfig::new("http://localhost:8000")
//!     .with_timeout(Duration::from_secs(300));
//!
//! let backend = HttpWorkflowBackend::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Response bodies are forwarded chunk by chunk as they arrive. Chunk
//! boundaries carry no meaning; the domain decoder reassembles frames.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::ports::{BackendError, EventByteStream, WorkflowBackend};

/// Longest error body kept in a [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the HTTP workflow backend.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the workflow service (default: http://localhost:8000).
    pub base_url: String,
    /// Path of the scan endpoint.
    pub fetch_path: String,
    /// Path prefix of the schedule endpoint; the thread id is appended.
    pub schedule_path: String,
    /// Whole-request timeout, covering the streamed body.
    pub timeout: Duration,
}

impl HttpBackendConfig {
    /// Creates a configuration with default paths and timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fetch_path: "/api/fetch-meetings".to_string(),
            schedule_path: "/api/schedule-meetings".to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Sets the scan endpoint path.
    pub fn with_fetch_path(mut self, path: impl Into<String>) -> Self {
        self.fetch_path = path.into();
        self
    }

    /// Sets the schedule endpoint path prefix.
    pub fn with_schedule_path(mut self, path: impl Into<String>) -> Self {
        self.schedule_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn fetch_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.fetch_path)
    }

    fn schedule_url(&self, thread_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            self.schedule_path.trim_end_matches('/'),
            thread_id
        )
    }
}

#[derive(Debug, Serialize)]
struct ScheduleRequest<'a> {
    resolution: &'a str,
}

/// Workflow backend reached over HTTP.
pub struct HttpWorkflowBackend {
    config: HttpBackendConfig,
    client: Client,
}

impl HttpWorkflowBackend {
    /// Creates a backend with its own connection pool.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            BackendError::network(format!("Connection failed: {}", e))
        } else if e.is_builder() {
            BackendError::InvalidRequest(e.to_string())
        } else {
            BackendError::network(e.to_string())
        }
    }

    /// Rejects non-success responses, keeping a bounded copy of the body.
    async fn handle_response_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        error!(status = status.as_u16(), "Workflow service rejected request");
        Err(BackendError::status(status.as_u16(), body))
    }

    fn into_byte_stream(response: Response, timeout_secs: u64) -> EventByteStream {
        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map(|bytes| bytes.to_vec()).map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout { timeout_secs }
                } else {
                    BackendError::network(format!("Stream error: {}", e))
                }
            })
        });
        Box::pin(stream)
    }
}

#[async_trait]
impl WorkflowBackend for HttpWorkflowBackend {
    async fn fetch_meetings(&self) -> Result<EventByteStream, BackendError> {
        let url = self.config.fetch_url();
        debug!(%url, "Starting meeting scan");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::handle_response_status(response).await?;

        Ok(Self::into_byte_stream(response, self.config.timeout.as_secs()))
    }

    async fn schedule_meetings(
        &self,
        thread_id: &str,
        resolution_text: &str,
    ) -> Result<EventByteStream, BackendError> {
        if thread_id.trim().is_empty() {
            return Err(BackendError::InvalidRequest("thread id is empty".to_string()));
        }
        let url = self.config.schedule_url(thread_id);
        debug!(%url, chars = resolution_text.len(), "Sending resolution");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&ScheduleRequest {
                resolution: resolution_text,
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::handle_response_status(response).await?;

        Ok(Self::into_byte_stream(response, self.config.timeout.as_secs()))
    }
}
