//! Stream decoding errors.

use thiserror::Error;

/// Longest frame excerpt kept in an error for diagnostics.
const PREVIEW_CHARS: usize = 120;

/// A single frame could not be turned into a [`StreamEvent`](super::StreamEvent).
///
/// Always recoverable: the decoder skips the frame and continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {reason}")]
    InvalidJson { reason: String, preview: String },

    #[error("frame has no 'type' discriminator")]
    MissingType { preview: String },

    #[error("unrecognized frame type '{kind}'")]
    UnknownType { kind: String, preview: String },

    #[error("'{kind}' frame has an unexpected shape: {reason}")]
    InvalidPayload {
        kind: String,
        reason: String,
        preview: String,
    },
}

impl FrameError {
    /// Beginning of the offending frame.
    pub fn preview(&self) -> &str {
        match self {
            FrameError::InvalidJson { preview, .. }
            | FrameError::MissingType { preview }
            | FrameError::UnknownType { preview, .. }
            | FrameError::InvalidPayload { preview, .. } => preview,
        }
    }
}

/// End-of-stream conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Bytes after the last delimiter never formed a complete frame.
    #[error("stream ended inside a frame ({bytes} bytes unconsumed)")]
    Truncated { bytes: usize, preview: String },
}

/// Char-boundary-safe excerpt of a frame.
pub(crate) fn preview(frame: &str) -> String {
    let trimmed = frame.trim();
    match trimmed.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
