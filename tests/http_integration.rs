//! Integration tests for the HTTP API.
//!
//! These tests exercise the full router, middleware included, against a
//! scripted workflow backend. Streams run on spawned tasks, so tests poll
//! the current cycle until it settles.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use mailbud::adapters::workflow::{Script, ScriptedWorkflowBackend};
use mailbud::adapters::{build_router, CycleAppState};
use mailbud::config::ServerConfig;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn scan() -> Script {
    Script::from_events(&[
        json!({"type": "thread_id", "content": "t1"}),
        json!({"type": "message", "content": "Scanning inbox"}),
        json!({"type": "final", "data": {
            "events_to_schedule": {"meetings": [{
                "summary": "Sync",
                "start": {"dateTime": "2024-03-20T10:00:00", "timeZone": "UTC"},
                "end": {"dateTime": "2024-03-20T10:30:00", "timeZone": "UTC"},
                "attendees": ["ana@example.com"]
            }]},
            "conflicting_events": null
        }}),
    ])
}

fn confirmation() -> Script {
    Script::from_events(&[json!({"type": "meetings_scheduled", "data": {"meetings": [{
        "summary": "Sync",
        "event_link": "https://calendar.example.com/e/1",
        "start": "2024-03-20T10:00:00",
        "end": "2024-03-20T10:30:00",
        "attendees": []
    }]}})])
}

fn app(backend: ScriptedWorkflowBackend) -> Router {
    let state = CycleAppState::new(Arc::new(backend)).with_message_display(Duration::ZERO);
    build_router(state, &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn wait_for_status(app: &Router, expected: &str) -> Value {
    for _ in 0..200 {
        let (_, view) = send(app, "GET", "/api/cycles/current", None).await;
        if view["status"] == expected {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("cycle never reached status {}", expected);
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn scan_select_and_submit() {
    let app = app(
        ScriptedWorkflowBackend::new()
            .with_fetch(scan())
            .with_schedule(confirmation()),
    );

    let (status, started) = send(&app, "POST", "/api/cycles", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(started["status"], "fetching");

    let view = wait_for_status(&app, "awaiting_resolution").await;
    assert_eq!(view["threadId"], "t1");
    assert!(view["message"].is_null());
    let key = view["meetings"][0]["key"].as_str().unwrap().to_string();

    let (status, view) = send(
        &app,
        "POST",
        &format!("/api/cycles/current/meetings/{}/selected", key),
        Some(json!({"checked": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["selectAll"], true);
    assert!(view["resolutionText"].as_str().unwrap().contains("Sync"));

    let (status, view) = send(
        &app,
        "PUT",
        &format!("/api/cycles/current/meetings/{}/draft", key),
        Some(json!({"text": "prefer mornings"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["meetings"][0]["draft"], "prefer mornings");

    let (status, submitted) = send(&app, "POST", "/api/cycles/current/submit", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(submitted["selectedKeys"], json!([key]));
    assert!(submitted["resolutionText"]
        .as_str()
        .unwrap()
        .contains("prefer mornings"));

    let view = wait_for_status(&app, "scheduled").await;
    assert_eq!(view["scheduled"][0]["summary"], "Sync");
    assert_eq!(view["meetings"][0]["draft"], Value::Null);
}

#[tokio::test]
async fn empty_submission_is_unprocessable() {
    let app = app(ScriptedWorkflowBackend::new().with_fetch(scan()));
    send(&app, "POST", "/api/cycles", None).await;
    wait_for_status(&app, "awaiting_resolution").await;

    let (status, error) = send(&app, "POST", "/api/cycles/current/submit", None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error["code"].is_string());
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn replace_without_selection_is_rejected() {
    let app = app(ScriptedWorkflowBackend::new().with_fetch(scan()));
    send(&app, "POST", "/api/cycles", None).await;
    let view = wait_for_status(&app, "awaiting_resolution").await;
    let key = view["meetings"][0]["key"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/cycles/current/meetings/{}/replace-conflicts", key),
        Some(json!({"checked": true})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, view) = send(&app, "GET", "/api/cycles/current", None).await;
    assert_eq!(view["resolutionText"], "");
}

#[tokio::test]
async fn hand_edit_is_reported_as_detached() {
    let app = app(ScriptedWorkflowBackend::new().with_fetch(scan()));
    send(&app, "POST", "/api/cycles", None).await;
    wait_for_status(&app, "awaiting_resolution").await;
    send(
        &app,
        "POST",
        "/api/cycles/current/select-all",
        Some(json!({"checked": true})),
    )
    .await;

    let (status, view) = send(
        &app,
        "PUT",
        "/api/cycles/current/document",
        Some(json!({"text": "Only schedule it if Ana agrees."})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["resolutionText"], "Only schedule it if Ana agrees.");
    assert_eq!(view["detachedBlocks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_scan_reports_error() {
    let app = app(ScriptedWorkflowBackend::new().with_fetch(Script::rejected(
        mailbud::ports::BackendError::status(503, "unavailable"),
    )));

    send(&app, "POST", "/api/cycles", None).await;
    let view = wait_for_status(&app, "failed").await;

    assert!(view["lastError"].as_str().unwrap().contains("503"));
}
