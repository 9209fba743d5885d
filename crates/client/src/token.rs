//! Advisory decoding of the bearer token's payload segment.
//!
//! The backend issues three-part dot-separated JWTs whose middle segment
//! is a base64url-encoded JSON object with the user id in the `sub`
//! claim. Decoding here exists only to route requests to the right
//! `/api/{user_id}/...` paths; it is NOT a trust boundary and performs no
//! signature verification. Token validity is judged solely by the
//! server's responses.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// The claims we care about. Everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct TokenPayload {
    sub: Option<String>,
}

/// Extract the `sub` claim from a bearer token.
///
/// Returns `None` for any malformed token: wrong segment count,
/// undecodable base64url, non-JSON payload, or a missing / non-string
/// `sub`. Never panics or errors; a bad token simply means "no derivable
/// identity".
pub fn decode_subject(token: &str) -> Option<String> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    // JWT segments are unpadded base64url; tolerate padded input too.
    let raw = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .ok()?;

    let payload: TokenPayload = serde_json::from_slice(&raw).ok()?;
    payload.sub
}
