//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST API for the scheduling UI
//! - `workflow` - Workflow service clients (HTTP, scripted)

pub mod http;
pub mod workflow;

pub use http::{build_router, CycleAppState};
pub use workflow::{HttpBackendConfig, HttpWorkflowBackend, Script, ScriptedWorkflowBackend};
