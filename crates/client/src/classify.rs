//! Response classification: one HTTP response in, one typed outcome out.
//!
//! Every response the [`ApiClient`](crate::api::ApiClient) receives runs
//! through [`classify`], which applies a fixed precedence ladder over the
//! status code and body and resolves to either a decoded payload or a
//! single [`ApiError`] kind. The ladder operates on already-read response
//! parts so the whole pipeline is testable without a socket.
//!
//! A 401 is the only branch with a side effect: it clears the session
//! before reporting [`ApiError::Unauthorized`]. Deciding whether to
//! navigate to a login surface after that is the caller's policy, not
//! this layer's.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::session::SessionStore;

/// Longest body preview carried by [`ApiError::UnexpectedFormat`].
const FORMAT_PREVIEW_CHARS: usize = 100;

/// Longest raw-body message carried by [`ApiError::RequestFailed`].
const FAILURE_PREVIEW_CHARS: usize = 200;

/// Classify a response into a decoded `T` or an [`ApiError`].
///
/// Precedence: 401 (clears the session), 403, 404, 422, 5xx, then the
/// success statuses, then any remaining 4xx. Empty bodies and 204 decode
/// `T` from JSON `null`, which satisfies `()` and `Option<_>` returns.
pub(crate) fn classify<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
    session: &SessionStore,
) -> Result<T, ApiError> {
    if status == StatusCode::UNAUTHORIZED {
        // The stored token is no longer honored; drop it so every caller
        // observes the logged-out state. Safe to repeat across
        // concurrent in-flight requests.
        session.clear_token();
        tracing::debug!("Received 401; cleared stored session");
        return Err(ApiError::Unauthorized);
    }

    if status == StatusCode::FORBIDDEN {
        return Err(ApiError::Forbidden);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Err(ApiError::Validation(validation_message(body)));
    }

    if status.is_server_error() {
        return Err(ApiError::Server);
    }

    if status.is_success() {
        return decode_success(status, content_type, body);
    }

    Err(ApiError::RequestFailed {
        message: failure_message(status, content_type, body),
        status: status.as_u16(),
    })
}

/// Decode the payload of a 2xx response.
fn decode_success<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, ApiError> {
    if status == StatusCode::NO_CONTENT || body.is_empty() {
        // "Empty payload" success: `()` and `Option<_>` deserialize from
        // null; payload-bearing ops surface the missing body instead.
        return serde_json::from_value(Value::Null)
            .map_err(|_| ApiError::UnexpectedFormat("empty response body".to_string()));
    }

    let text = String::from_utf8_lossy(body);
    if !is_json(content_type) {
        return Err(ApiError::UnexpectedFormat(truncate(
            &text,
            FORMAT_PREVIEW_CHARS,
        )));
    }

    serde_json::from_slice(body)
        .map_err(|_| ApiError::UnexpectedFormat(truncate(&text, FORMAT_PREVIEW_CHARS)))
}

/// Build the message for a 422 validation failure.
///
/// The backend reports `{"detail": [...]}` where each issue carries a
/// `msg` (or `message`) field; those are joined with `", "`. A plain
/// string `detail` is used verbatim; anything else falls back to a
/// generic message.
fn validation_message(body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    match parsed.as_ref().and_then(|v| v.get("detail")) {
        Some(Value::Array(issues)) => {
            let joined = issues
                .iter()
                .filter_map(|issue| {
                    issue
                        .get("msg")
                        .or_else(|| issue.get("message"))
                        .and_then(Value::as_str)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("Validation error: {joined}")
        }
        Some(Value::String(detail)) => detail.clone(),
        _ => "Validation failed".to_string(),
    }
}

/// Build the message for an unclassified 4xx failure.
///
/// Prefers a JSON `detail`/`message` field; recognizes HTML error pages
/// by their doctype/html tag; otherwise carries a truncated raw-body
/// preview, falling back to the bare status when the body is empty.
fn failure_message(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> String {
    if is_json(content_type) {
        if let Ok(parsed) = serde_json::from_slice::<Value>(body) {
            if let Some(detail) = parsed
                .get("detail")
                .or_else(|| parsed.get("message"))
                .and_then(Value::as_str)
            {
                return detail.to_string();
            }
        }
    } else {
        let text = String::from_utf8_lossy(body);
        if text.contains("<!DOCTYPE") || text.contains("<html") {
            return "server returned a page instead of data".to_string();
        }
        if !text.trim().is_empty() {
            return truncate(&text, FAILURE_PREVIEW_CHARS);
        }
    }

    format!("request failed with status {}", status.as_u16())
}

/// Whether the content type declares a JSON body.
fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("application/json"))
}

/// Truncate to at most `max_chars` characters, respecting char
/// boundaries so multi-byte bodies cannot split a code point.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
