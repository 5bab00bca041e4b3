//! Cycle errors.

use thiserror::Error;

use crate::domain::foundation::CycleStatus;
use crate::domain::resolution::ResolutionError;

/// A cycle-level request that was rejected without changing state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("a workflow stream is already running ({0})")]
    AlreadyRunning(CycleStatus),

    #[error("no meeting scan has finished yet")]
    NoSnapshot,

    #[error("resolution cannot be changed while the cycle is {0}")]
    ResolutionClosed(CycleStatus),

    #[error("the workflow did not report a thread id")]
    NoThreadId,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl CycleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CycleError::AlreadyRunning(_) => "CYCLE_ALREADY_RUNNING",
            CycleError::NoSnapshot => "NO_SNAPSHOT",
            CycleError::ResolutionClosed(_) => "RESOLUTION_CLOSED",
            CycleError::NoThreadId => "NO_THREAD_ID",
            CycleError::Resolution(err) => err.code(),
        }
    }
}
