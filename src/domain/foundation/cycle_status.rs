//! CycleStatus enum for tracking the lifecycle of a workflow cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of one fetch/resolve/schedule cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// No cycle has been started yet.
    #[default]
    Idle,
    /// Streaming the meeting scan from the backend.
    Fetching,
    /// Snapshot received, waiting for the user to resolve and submit.
    AwaitingResolution,
    /// Resolution submitted, streaming the scheduling confirmation.
    Submitting,
    /// Backend confirmed the scheduled meetings.
    Scheduled,
    /// The scan ended without a usable result.
    Failed,
}

impl CycleStatus {
    /// Returns true while a backend stream is being consumed.
    pub fn is_streaming(&self) -> bool {
        matches!(self, CycleStatus::Fetching | CycleStatus::Submitting)
    }

    /// Returns true if the user may toggle selections.
    pub fn accepts_resolution(&self) -> bool {
        matches!(self, CycleStatus::AwaitingResolution)
    }
}

impl StateMachine for CycleStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CycleStatus::*;
        matches!(
            (self, target),
            (Idle, Fetching)
                | (Fetching, AwaitingResolution)
                | (Fetching, Failed)
                | (AwaitingResolution, Fetching)
                | (AwaitingResolution, Submitting)
                | (Submitting, Scheduled)
                | (Submitting, AwaitingResolution)
                | (Scheduled, Fetching)
                | (Failed, Fetching)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CycleStatus::*;
        match self {
            Idle => vec![Fetching],
            Fetching => vec![AwaitingResolution, Failed],
            AwaitingResolution => vec![Fetching, Submitting],
            Submitting => vec![Scheduled, AwaitingResolution],
            Scheduled => vec![Fetching],
            Failed => vec![Fetching],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleStatus::Idle => "Idle",
            CycleStatus::Fetching => "Fetching",
            CycleStatus::AwaitingResolution => "Awaiting resolution",
            CycleStatus::Submitting => "Submitting",
            CycleStatus::Scheduled => "Scheduled",
            CycleStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}
