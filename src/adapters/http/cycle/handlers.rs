//! HTTP handlers for cycle endpoints.
//!
//! These handlers connect Axum routes to application layer handlers.
//! Streams run on background tasks; every endpoint answers immediately.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::debug;

use crate::application::{
    ResolveMeetingsHandler, RunFetchCycleHandler, SharedCycle, SubmitResolutionHandler,
    DEFAULT_MESSAGE_DISPLAY,
};
use crate::domain::cycle::CycleError;
use crate::domain::foundation::{CycleStatus, MeetingKey};
use crate::domain::resolution::ResolutionError;
use crate::ports::WorkflowBackend;

use super::dto::{
    CycleStartedResponse, CycleView, ErrorResponse, SubmissionResponse, TextRequest,
    ToggleRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct CycleAppState {
    pub backend: Arc<dyn WorkflowBackend>,
    pub cycle: SharedCycle,
    pub message_display: Duration,
}

impl CycleAppState {
    pub fn new(backend: Arc<dyn WorkflowBackend>) -> Self {
        Self {
            backend,
            cycle: SharedCycle::new(),
            message_display: DEFAULT_MESSAGE_DISPLAY,
        }
    }

    pub fn with_message_display(mut self, message_display: Duration) -> Self {
        self.message_display = message_display;
        self
    }

    pub fn fetch_handler(&self) -> RunFetchCycleHandler {
        RunFetchCycleHandler::new(self.backend.clone(), self.cycle.clone())
            .with_message_display(self.message_display)
    }

    pub fn submit_handler(&self) -> SubmitResolutionHandler {
        SubmitResolutionHandler::new(self.backend.clone(), self.cycle.clone())
            .with_message_display(self.message_display)
    }

    pub fn resolve_handler(&self) -> ResolveMeetingsHandler {
        ResolveMeetingsHandler::new(self.cycle.clone())
    }

    async fn view(&self) -> CycleView {
        CycleView::from_cycle(&*self.cycle.read().await)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stream Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/cycles - Start a meeting scan
pub async fn start_cycle(
    State(state): State<CycleAppState>,
) -> Result<impl IntoResponse, CycleApiError> {
    let handler = state.fetch_handler();
    let scan = handler.start().await?;

    tokio::spawn(async move {
        handler.run(scan).await;
    });

    let response = CycleStartedResponse {
        cycle_id: scan.cycle_id.to_string(),
        status: CycleStatus::Fetching,
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/cycles/current/submit - Submit the resolution
pub async fn submit_resolution(
    State(state): State<CycleAppState>,
) -> Result<impl IntoResponse, CycleApiError> {
    let handler = state.submit_handler();
    let pending = handler.start().await?;

    let response = SubmissionResponse {
        cycle_id: pending.cycle_id.to_string(),
        command: pending.command.clone(),
    };

    tokio::spawn(async move {
        handler.run(&pending).await;
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/cycles/current - Current cycle state
pub async fn get_current_cycle(State(state): State<CycleAppState>) -> impl IntoResponse {
    Json(state.view().await)
}

// ════════════════════════════════════════════════════════════════════════════════
// Resolution Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/cycles/current/select-all
pub async fn toggle_select_all(
    State(state): State<CycleAppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<impl IntoResponse, CycleApiError> {
    state
        .resolve_handler()
        .toggle_select_all(request.checked)
        .await?;
    Ok(Json(state.view().await))
}

/// POST /api/cycles/current/meetings/:key/selected
pub async fn toggle_meeting_selected(
    State(state): State<CycleAppState>,
    Path(key): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<impl IntoResponse, CycleApiError> {
    let key = parse_key(&key)?;
    state
        .resolve_handler()
        .toggle_meeting_selected(key, request.checked)
        .await?;
    Ok(Json(state.view().await))
}

/// POST /api/cycles/current/meetings/:key/replace-conflicts
pub async fn toggle_replace_conflicts(
    State(state): State<CycleAppState>,
    Path(key): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<impl IntoResponse, CycleApiError> {
    let key = parse_key(&key)?;
    state
        .resolve_handler()
        .toggle_replace_conflicting(key, request.checked)
        .await?;
    Ok(Json(state.view().await))
}

/// PUT /api/cycles/current/meetings/:key/draft
pub async fn set_draft(
    State(state): State<CycleAppState>,
    Path(key): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<impl IntoResponse, CycleApiError> {
    let key = parse_key(&key)?;
    state.resolve_handler().set_draft(key, request.text).await?;
    Ok(Json(state.view().await))
}

/// PUT /api/cycles/current/document - Hand edit of the resolution text
pub async fn edit_document(
    State(state): State<CycleAppState>,
    Json(request): Json<TextRequest>,
) -> Result<impl IntoResponse, CycleApiError> {
    let detached = state.resolve_handler().edit_document(&request.text).await?;
    debug!(detached = detached.len(), "Resolution text edited");
    Ok(Json(state.view().await))
}

fn parse_key(raw: &str) -> Result<MeetingKey, CycleApiError> {
    raw.parse()
        .map_err(|_| CycleApiError::BadRequest(format!("Invalid meeting key: {}", raw)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub enum CycleApiError {
    BadRequest(String),
    Cycle(CycleError),
}

impl From<CycleError> for CycleApiError {
    fn from(err: CycleError) -> Self {
        CycleApiError::Cycle(err)
    }
}

impl IntoResponse for CycleApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            CycleApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            CycleApiError::Cycle(err) => {
                let status = match &err {
                    CycleError::AlreadyRunning(_) | CycleError::ResolutionClosed(_) => {
                        StatusCode::CONFLICT
                    }
                    CycleError::NoSnapshot
                    | CycleError::Resolution(ResolutionError::UnknownMeeting(_)) => {
                        StatusCode::NOT_FOUND
                    }
                    CycleError::NoThreadId => StatusCode::BAD_GATEWAY,
                    CycleError::Resolution(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                let error = ErrorResponse::new(err.code(), err.to_string());
                let error = match &err {
                    CycleError::AlreadyRunning(current) | CycleError::ResolutionClosed(current) => {
                        error.with_details(json!({ "status": current }))
                    }
                    _ => error,
                };
                (status, error)
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CycleError) -> StatusCode {
        CycleApiError::from(err).into_response().status()
    }

    #[test]
    fn cycle_errors_map_to_status_codes() {
        assert_eq!(
            status_of(CycleError::AlreadyRunning(CycleStatus::Fetching)),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(CycleError::NoSnapshot), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CycleError::NoThreadId), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(CycleError::Resolution(ResolutionError::EmptySelection)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(CycleError::Resolution(ResolutionError::UnknownMeeting(MeetingKey::new()))),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn conflict_reports_current_status() {
        let response =
            CycleApiError::from(CycleError::AlreadyRunning(CycleStatus::Submitting)).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "CYCLE_ALREADY_RUNNING");
        assert_eq!(body["details"]["status"], "submitting");
    }

    #[test]
    fn invalid_key_is_bad_request() {
        let err = parse_key("not-a-uuid").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
