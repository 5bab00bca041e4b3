//! Error types shared across the domain layer.

use std::fmt::Debug;
use thiserror::Error;

/// Errors raised when a value or transition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl ValidationError {
    /// Creates a rejected state transition error.
    pub fn invalid_transition(from: impl Debug, to: impl Debug) -> Self {
        ValidationError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}
