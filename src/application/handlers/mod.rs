//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod resolve_meetings;
mod run_fetch_cycle;
mod stream_driver;
mod submit_resolution;

pub use resolve_meetings::ResolveMeetingsHandler;
pub use run_fetch_cycle::{PendingScan, RunFetchCycleHandler, DEFAULT_MESSAGE_DISPLAY};
pub use stream_driver::StreamOutcome;
pub use submit_resolution::{PendingSubmission, SubmitResolutionHandler};
