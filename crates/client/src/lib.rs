//! HTTP client and session layer for the taskdeck API.
//!
//! Centralizes bearer-token storage ([`session`]), advisory JWT payload
//! decoding ([`token`]), authenticated request construction and dispatch
//! ([`api`]), and the classification of every HTTP response into a typed
//! success value or a typed [`error::ApiError`].
//!
//! The client never issues or verifies tokens; it stores whatever the
//! server hands out at login and lets the server judge validity. A 401 on
//! any call clears the stored session so callers can route the user back
//! to a login surface.

pub mod api;
pub mod error;
pub mod session;
pub mod token;

mod classify;
