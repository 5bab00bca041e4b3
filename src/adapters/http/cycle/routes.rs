//! Route configuration for cycle endpoints.
//!
//! Configures Axum router with cycle-related routes.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{
    edit_document, get_current_cycle, set_draft, start_cycle, submit_resolution,
    toggle_meeting_selected, toggle_replace_conflicts, toggle_select_all, CycleAppState,
};

/// Creates the cycle router with all endpoints.
///
/// Routes:
/// - `POST /api/cycles` - Start a meeting scan
/// - `GET /api/cycles/current` - Current cycle state
/// - `POST /api/cycles/current/select-all` - Select or clear every meeting
/// - `POST /api/cycles/current/meetings/:key/selected` - Select one meeting
/// - `POST /api/cycles/current/meetings/:key/replace-conflicts` - Replace its conflicts
/// - `PUT /api/cycles/current/meetings/:key/draft` - Reschedule instructions
/// - `PUT /api/cycles/current/document` - Hand edit of the resolution text
/// - `POST /api/cycles/current/submit` - Submit the resolution
pub fn cycle_router() -> Router<CycleAppState> {
    Router::new()
        .route("/api/cycles", post(start_cycle))
        .route("/api/cycles/current", get(get_current_cycle))
        .route("/api/cycles/current/select-all", post(toggle_select_all))
        .route(
            "/api/cycles/current/meetings/:key/selected",
            post(toggle_meeting_selected),
        )
        .route(
            "/api/cycles/current/meetings/:key/replace-conflicts",
            post(toggle_replace_conflicts),
        )
        .route("/api/cycles/current/meetings/:key/draft", put(set_draft))
        .route("/api/cycles/current/document", put(edit_document))
        .route("/api/cycles/current/submit", post(submit_resolution))
}
