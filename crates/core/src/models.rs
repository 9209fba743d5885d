//! Wire models for the taskdeck REST API.
//!
//! These mirror the JSON bodies the backend produces and consumes: task
//! records keyed by owner, user records returned by the auth endpoints,
//! and the request payloads for task creation/update and credentials.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Timestamp};

/// A single task record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Owner of the task; every task belongs to exactly one user.
    pub user_id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for task creation and update.
///
/// Completion state is never set through this payload; it changes only via
/// the dedicated toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

/// A user record as returned by `register` and `/api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub role: UserRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `login` and `register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response body of a successful `login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    /// The bearer token to attach to subsequent requests.
    pub access_token: String,
    /// Always `"bearer"` for this API.
    pub token_type: String,
}
