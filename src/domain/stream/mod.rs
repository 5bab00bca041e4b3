//! Workflow stream - framing and typed events.
//!
//! The backend answers each trigger with a long-lived response made of
//! blank-line separated JSON frames. [`StreamDecoder`] turns raw chunks into
//! [`StreamEvent`]s; applying them to state is the caller's job.

mod decoder;
mod errors;
mod event;

pub use decoder::{parse_frame, DecodedFrame, DecoderState, StreamDecoder, FRAME_DELIMITER};
pub use errors::{FrameError, StreamError};
pub use event::{
    ConflictPayload, FinalPayload, MeetingList, ScheduledMeetingList, StreamEvent,
    KNOWN_EVENT_TYPES,
};
