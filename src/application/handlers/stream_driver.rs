//! Drives a backend byte stream through the decoder into the cycle.

use futures::StreamExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::domain::foundation::StreamId;
use crate::domain::stream::{StreamDecoder, StreamEvent};
use crate::ports::{BackendError, EventByteStream};

use crate::application::SharedCycle;

/// How one backend stream went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Frames decoded and applied.
    pub frames_decoded: usize,
    /// Malformed frames skipped.
    pub frames_rejected: usize,
    /// The stream ended inside a frame.
    pub truncated: bool,
    /// The call or the body stream failed.
    pub transport_error: Option<BackendError>,
    /// A newer stream replaced this one before it closed.
    pub superseded: bool,
}

impl StreamOutcome {
    pub(crate) fn failed(error: BackendError) -> Self {
        Self {
            transport_error: Some(error),
            ..Self::default()
        }
    }
}

/// Records a failed backend call on the stream it was made for.
pub(crate) async fn record_transport_error(
    cycle: &SharedCycle,
    stream_id: StreamId,
    err: &BackendError,
) {
    error!(
        stream = %stream_id,
        error = %err,
        retryable = err.is_retryable(),
        "Workflow service call failed"
    );
    cycle.write().await.fail_stream(stream_id, err.to_string());
}

/// Decodes `stream` and applies every event to the cycle, in order.
///
/// Stops as soon as the cycle opens another stream; frames still in flight
/// from this one are dropped.
///
/// After each `message` event the loop waits `message_display` before
/// applying anything else, so each progress message stays visible at least
/// that long.
pub(crate) async fn drive_stream(
    cycle: &SharedCycle,
    stream_id: StreamId,
    mut stream: EventByteStream,
    message_display: Duration,
) -> StreamOutcome {
    let mut decoder = StreamDecoder::new();
    let mut outcome = StreamOutcome::default();

    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                record_transport_error(cycle, stream_id, &err).await;
                outcome.transport_error = Some(err);
                return tally(outcome, &decoder);
            }
        };

        for frame in decoder.feed(&bytes) {
            let pause = matches!(frame, Ok(StreamEvent::Message { .. })) && !message_display.is_zero();
            {
                let mut current = cycle.write().await;
                if !current.is_current_stream(stream_id) {
                    debug!(stream = %stream_id, "Stream was replaced; abandoning it");
                    outcome.superseded = true;
                    return tally(outcome, &decoder);
                }
                match frame {
                    Ok(event) => current.apply_event(event),
                    Err(err) => current.record_warning(format!("skipped malformed frame: {}", err)),
                }
            }
            if pause {
                sleep(message_display).await;
            }
        }
    }

    let finished = decoder.finish();
    outcome.truncated = finished.is_err();
    let mut current = cycle.write().await;
    outcome.superseded = !current.is_current_stream(stream_id);
    current.finish_stream(stream_id, finished);
    drop(current);
    tally(outcome, &decoder)
}

fn tally(mut outcome: StreamOutcome, decoder: &StreamDecoder) -> StreamOutcome {
    outcome.frames_decoded = decoder.frames_decoded();
    outcome.frames_rejected = decoder.frames_rejected();
    outcome
}
