//! HTTP adapter for the cycle module.
//!
//! This module exposes the current scheduling cycle via REST endpoints.
//! There is one cycle per server; starting a scan replaces it.

pub mod dto;
pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use handlers::CycleAppState;
pub use routes::cycle_router;
