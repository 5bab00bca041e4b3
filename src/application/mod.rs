//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Stream handlers feed decoded backend events into the shared cycle; user
//! action handlers mutate its resolution session.

pub mod handlers;
mod shared_cycle;

pub use handlers::{
    PendingScan, PendingSubmission, ResolveMeetingsHandler, RunFetchCycleHandler, StreamOutcome,
    SubmitResolutionHandler, DEFAULT_MESSAGE_DISPLAY,
};
pub use shared_cycle::SharedCycle;
