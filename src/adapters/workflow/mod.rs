//! Workflow Backend Adapters.
//!
//! Implementations of the WorkflowBackend port.
//!
//! ## Available Adapters
//!
//! - `HttpWorkflowBackend` - The workflow service over HTTP
//! - `ScriptedWorkflowBackend` - Replays canned event streams for tests and demos

mod http_backend;
mod scripted_backend;

pub use http_backend::{HttpBackendConfig, HttpWorkflowBackend};
pub use scripted_backend::{encode_frames, ScheduleCall, Script, ScriptStep, ScriptedWorkflowBackend};
