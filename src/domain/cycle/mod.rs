//! Cycle module - The fetch, resolve and schedule round trip.
//!
//! A [`WorkflowCycle`] starts with a meeting scan, waits for the user to
//! resolve the proposed meetings and ends once the backend confirms what it
//! scheduled. Starting a new scan discards all state of the previous one.

mod aggregate;
mod errors;

pub use aggregate::WorkflowCycle;
pub use errors::CycleError;
