//! Resolution module - user selections kept in step with the resolution text.
//!
//! [`ResolutionSession`] owns the per-meeting choices and the
//! [`ResolutionDocument`]. Every toggle appends or removes exactly one
//! identified block; user-written text between blocks is never touched.

mod blocks;
mod choice;
mod document;
mod errors;
mod session;
mod submission;

pub use blocks::{draft_block, replace_conflicts_block, schedule_block, select_all_block};
pub use choice::MeetingChoice;
pub use document::{BlockId, BlockKind, ResolutionDocument};
pub use errors::ResolutionError;
pub use session::ResolutionSession;
pub use submission::SubmissionCommand;
