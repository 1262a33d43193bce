//! Text frame codec
//!
//! Outbound requests become compact JSON objects; inbound text must be a
//! JSON object to be accepted as an [`Envelope`].

use serde_json::Value;
use thiserror::Error;

use super::schema::{Envelope, OutboundRequest};

/// Inbound decoding failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is not a well-formed JSON object
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },
}

/// Encode an outbound request as a text frame
///
/// Requests only hold strings, so this does not fail in practice; the
/// serde error is still passed up rather than swallowed.
pub fn encode(request: &OutboundRequest) -> serde_json::Result<String> {
    serde_json::to_string(request)
}

/// Decode a text frame into an envelope
pub fn decode(text: &str) -> Result<Envelope, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| DecodeError::MalformedFrame {
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(object) => Ok(Envelope::from_object(object)),
        other => Err(DecodeError::MalformedFrame {
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

/// Decode a request frame the way a gateway would read it
pub fn decode_request(text: &str) -> Result<OutboundRequest, DecodeError> {
    serde_json::from_str(text).map_err(|e| DecodeError::MalformedFrame {
        reason: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
