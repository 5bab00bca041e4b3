//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, lifecycle statuses and error types
//! that form the vocabulary of the MailBud domain.

mod cycle_status;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use cycle_status::CycleStatus;
pub use errors::ValidationError;
pub use ids::{CycleId, MeetingKey, StreamId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
