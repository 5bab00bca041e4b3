//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod cycle;
mod router;

// Re-export key types for convenience
pub use cycle::{cycle_router, CycleAppState};
pub use router::build_router;
