//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `WorkflowBackend` - The meeting workflow service and its event streams

mod workflow_backend;

pub use workflow_backend::{BackendError, EventByteStream, WorkflowBackend};
