//! Failure taxonomy for API calls.
//!
//! Every call through [`ApiClient`](crate::api::ApiClient) resolves to
//! either a decoded payload or exactly one of these kinds. All kinds are
//! terminal for the call that produced them; nothing is retried
//! internally. [`ApiError::Unauthorized`] is the only kind with a side
//! effect (the session is cleared before it is returned).

/// Classified outcome of a failed API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No user id could be resolved (no explicit id and no decodable
    /// token). Raised before any network activity.
    #[error("user id not found - please login again")]
    MissingIdentity,

    /// The server rejected the credential (401). The local session has
    /// already been cleared when this is returned.
    #[error("unauthorized - please login again")]
    Unauthorized,

    /// The server understood the credential but denied access (403).
    #[error("forbidden - you do not have permission to access this resource")]
    Forbidden,

    /// The requested resource does not exist (404).
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request body (422). The message is the
    /// joined validation detail from the response.
    #[error("{0}")]
    Validation(String),

    /// The server failed internally (5xx). The body is not trusted, so
    /// no detail is carried.
    #[error("server error - please try again later")]
    Server,

    /// A 2xx response carried a body that could not be interpreted as
    /// JSON. Carries a bounded preview of the body.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Any other 4xx. Carries the best message extractable from the
    /// response body and the numeric status.
    #[error("{message}")]
    RequestFailed {
        message: String,
        status: u16,
    },

    /// The request never produced a response (DNS failure, connection
    /// refused, aborted body stream).
    #[error("network error - unable to reach server: {0}")]
    Network(String),
}
