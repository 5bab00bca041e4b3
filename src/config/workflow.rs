//! Workflow presentation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Longest accepted message display time.
const MAX_MESSAGE_DISPLAY_MS: u64 = 60_000;

/// How decoded workflow events are paced
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Minimum time a progress message stays visible before the next event
    /// is applied, in milliseconds
    #[serde(default = "default_message_display_ms")]
    pub message_display_ms: u64,
}

impl WorkflowConfig {
    pub fn message_display(&self) -> Duration {
        Duration::from_millis(self.message_display_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message_display_ms > MAX_MESSAGE_DISPLAY_MS {
            return Err(ValidationError::MessageDisplayTooLong {
                max_ms: MAX_MESSAGE_DISPLAY_MS,
            });
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            message_display_ms: default_message_display_ms(),
        }
    }
}

fn default_message_display_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_is_two_seconds() {
        assert_eq!(WorkflowConfig::default().message_display(), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_display_is_allowed() {
        let config = WorkflowConfig { message_display_ms: 0 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_excessive_display_is_rejected() {
        let config = WorkflowConfig { message_display_ms: 120_000 };
        assert!(config.validate().is_err());
    }
}
