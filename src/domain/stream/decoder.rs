//! Incremental decoder for the blank-line framed workflow stream.
//!
//! Network reads hand over arbitrary byte chunks: a chunk may hold several
//! frames, end in the middle of a frame, or even split a multi-byte UTF-8
//! sequence. The decoder keeps whatever follows the last delimiter (and any
//! incomplete UTF-8 tail) and prepends it to the next chunk, so the decoded
//! event sequence does not depend on where the transport cut the bytes.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::foundation::StateMachine;

use super::errors::preview;
use super::{FrameError, StreamError, StreamEvent, KNOWN_EVENT_TYPES};

/// Separator between frames.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Lifecycle of one decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Nothing received yet.
    #[default]
    Idle,
    /// Receiving chunks; a partial frame may be buffered.
    Buffering,
    /// A terminal event was decoded.
    Complete,
}

impl StateMachine for DecoderState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DecoderState::*;
        matches!((self, target), (Idle, Buffering) | (Buffering, Complete))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DecoderState::*;
        match self {
            Idle => vec![Buffering],
            Buffering => vec![Complete],
            Complete => vec![],
        }
    }
}

/// Result of decoding one frame.
pub type DecodedFrame = Result<StreamEvent, FrameError>;

/// Owned, per-stream decoder state.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
    pending_utf8: Vec<u8>,
    state: DecoderState,
    frames_decoded: usize,
    frames_rejected: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Returns true once a terminal event has been decoded.
    pub fn is_complete(&self) -> bool {
        self.state == DecoderState::Complete
    }

    /// Number of frames successfully decoded so far.
    pub fn frames_decoded(&self) -> usize {
        self.frames_decoded
    }

    /// Number of frames skipped as malformed so far.
    pub fn frames_rejected(&self) -> usize {
        self.frames_rejected
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.pending_utf8.len()
    }

    /// Decodes every frame completed by `chunk`, in stream order.
    ///
    /// Malformed frames are returned as `Err` entries and do not stop
    /// decoding of the frames that follow them.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodedFrame> {
        if self.state == DecoderState::Idle {
            self.advance(DecoderState::Buffering);
        }

        let text = self.decode_utf8(chunk);
        self.buffer.push_str(&text);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].find(FRAME_DELIMITER) {
            let frame = &self.buffer[consumed..consumed + offset];
            consumed += offset + FRAME_DELIMITER.len();
            if frame.trim().is_empty() {
                continue;
            }
            frames.push(parse_frame(frame));
        }
        self.buffer.drain(..consumed);

        for frame in &frames {
            match frame {
                Ok(event) => {
                    self.frames_decoded += 1;
                    debug!(kind = event.kind(), "Decoded stream frame");
                    if event.is_terminal() && self.state == DecoderState::Buffering {
                        self.advance(DecoderState::Complete);
                    }
                }
                Err(err) => {
                    self.frames_rejected += 1;
                    warn!(error = %err, frame = err.preview(), "Skipping malformed stream frame");
                }
            }
        }

        frames
    }

    /// Signals end of stream.
    ///
    /// Fails if bytes of an unfinished frame are still buffered; events
    /// already returned by [`feed`](Self::feed) stay valid either way.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        let leftover = self.buffer.trim();
        if leftover.is_empty() && self.pending_utf8.is_empty() {
            self.buffer.clear();
            return Ok(());
        }

        let bytes = leftover.len() + self.pending_utf8.len();
        let err = StreamError::Truncated {
            bytes,
            preview: preview(leftover),
        };
        warn!(bytes, "Stream ended with an incomplete frame");
        self.buffer.clear();
        self.pending_utf8.clear();
        Err(err)
    }

    fn advance(&mut self, target: DecoderState) {
        match self.state.transition_to(target) {
            Ok(next) => self.state = next,
            Err(err) => debug!(error = %err, "Ignoring decoder state change"),
        }
    }

    /// Decodes as much UTF-8 as possible, holding back an incomplete tail.
    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending_utf8);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    match err.error_len() {
                        Some(len) => {
                            warn!(len, "Replacing invalid UTF-8 in stream");
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid_up_to + len..];
                        }
                        None => {
                            self.pending_utf8 = rest[valid_up_to..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

/// Parses one frame's text into a typed event.
pub fn parse_frame(frame: &str) -> DecodedFrame {
    let value: Value = serde_json::from_str(frame).map_err(|e| FrameError::InvalidJson {
        reason: e.to_string(),
        preview: preview(frame),
    })?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| FrameError::MissingType {
            preview: preview(frame),
        })?
        .to_string();

    if !KNOWN_EVENT_TYPES.contains(&kind.as_str()) {
        return Err(FrameError::UnknownType {
            kind,
            preview: preview(frame),
        });
    }

    serde_json::from_value(value).map_err(|e| FrameError::InvalidPayload {
        kind,
        reason: e.to_string(),
        preview: preview(frame),
    })
}
