//! Shared types for the taskdeck client.
//!
//! Contains the wire models exchanged with the taskdeck REST API
//! (tasks, users, auth payloads) and the common id/timestamp aliases.

pub mod models;
pub mod types;
