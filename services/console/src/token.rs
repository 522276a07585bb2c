//! Session token decoding
//!
//! Tokens are compact three-segment JWTs issued by the backend. The console
//! only ever reads the payload segment: signatures are never checked here,
//! so everything decoded by this module is an optimistic hint for choosing a
//! screen. The backend re-validates the token on every API call and remains
//! the sole authority on whether a session is genuine.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fallback identity shown when a token carries no email
pub const GUEST_EMAIL: &str = "Guest";

/// Reasons a token cannot be decoded
#[derive(Error, Debug)]
pub enum TokenError {
    /// Token does not have exactly three dot-separated segments
    #[error("Token must have three segments, found {0}")]
    MissingSegment(usize),

    /// Payload segment is not valid base64
    #[error("Token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Payload is not valid JSON
    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is JSON but not an object
    #[error("Token payload is not a JSON object")]
    NotAnObject,

    /// Payload lacks an integer `exp` claim
    #[error("Token payload has no integer exp claim")]
    MissingExpiry,
}

/// Claims the console reads from a token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Signed-in identity, `"Guest"` when absent
    pub email: String,
    /// Owning business entity, only present for clients
    pub client_id: Option<String>,
    /// Expiry in seconds since the epoch
    pub exp: Option<i64>,
}

impl Claims {
    fn from_payload(payload: &Map<String, Value>) -> Self {
        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .unwrap_or(GUEST_EMAIL)
            .to_string();

        let client_id = match payload.get("clientId") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        let exp = payload.get("exp").and_then(Value::as_i64);

        Claims {
            email,
            client_id,
            exp,
        }
    }

    /// Expiry instant in milliseconds since the epoch
    pub fn expires_at_ms(&self) -> Result<i64, TokenError> {
        self.exp
            .and_then(|exp| exp.checked_mul(1000))
            .ok_or(TokenError::MissingExpiry)
    }
}

/// Decode the payload segment of `token` into a JSON object
pub fn decode_payload(token: &str) -> Result<Map<String, Value>, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::MissingSegment(segments.len()));
    }

    let bytes = decode_segment(segments[1])?;
    match serde_json::from_slice(&bytes)? {
        Value::Object(payload) => Ok(payload),
        _ => Err(TokenError::NotAnObject),
    }
}

/// Accepts base64url with or without padding, and the standard alphabet.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    URL_SAFE_NO_PAD.decode(normalized)
}

/// Decode the claims of a session token without verifying its signature
///
/// Callers that only need the claims for display must treat an error as "no
/// session" rather than surfacing it.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let payload = decode_payload(token)?;
    Ok(Claims::from_payload(&payload))
}

/// Build an unsigned token around `payload`
#[cfg(test)]
pub(crate) fn encode_unsigned(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.")
}

/// Same as [`encode_unsigned`] but with padded segments
#[cfg(test)]
pub(crate) fn encode_unsigned_padded(payload: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE;

    let header = URL_SAFE.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE.encode(payload.to_string());
    format!("{header}.{body}.sig")
}
