//! MailBud - Meeting Scheduling Assistant
//!
//! This crate backs the meeting scheduling UI: it streams progress from the
//! email workflow service, turns the proposed meetings and their calendar
//! conflicts into a resolution session, and keeps the user's selections and
//! the editable resolution text in sync until the resolution is submitted.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
