//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, statuses, errors)
//! - `meeting` - Proposed meetings, calendar conflicts and the scan snapshot
//! - `stream` - Framing and decoding of the workflow event stream
//! - `resolution` - Meeting selections and the resolution document
//! - `cycle` - The fetch, resolve and schedule round trip

pub mod cycle;
pub mod foundation;
pub mod meeting;
pub mod resolution;
pub mod stream;
