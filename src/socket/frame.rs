//! Socket message envelope.
//!
//! Every text frame, in either direction, is a JSON object
//! `{"channel": "<name>", "payload": {...}}`. Inbound payloads may also be
//! a JSON string holding the serialized object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object, the unit of payload on both HTTP bodies and socket events.
pub type JsonObject = Map<String, Value>;

/// Reasons an inbound socket message is dropped.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    #[error("payload is not a JSON object")]
    MalformedPayload,

    #[error("no identity could be extracted from the payload")]
    ExtractionFailed,

    #[error("no handler registered for channel '{0}'")]
    UnknownChannel(String),

    #[error("identity extractor panicked")]
    ExtractorPanicked,

    #[error("handler for channel '{0}' panicked")]
    HandlerPanicked(String),
}

impl FrameError {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            FrameError::MalformedFrame(_) => "malformed_frame",
            FrameError::MalformedPayload => "malformed_payload",
            FrameError::ExtractionFailed => "extraction_failed",
            FrameError::UnknownChannel(_) => "unknown_channel",
            FrameError::ExtractorPanicked => "extractor_panicked",
            FrameError::HandlerPanicked(_) => "handler_panicked",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    channel: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Serialize)]
struct OutboundFrame<'a> {
    channel: &'a str,
    payload: &'a JsonObject,
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub channel: String,
    pub payload: JsonObject,
}

/// Decode an inbound text frame.
pub fn decode_event(text: &str) -> Result<InboundEvent, FrameError> {
    let raw: RawFrame = serde_json::from_str(text).map_err(FrameError::MalformedFrame)?;
    let payload = match raw.payload {
        Value::Object(object) => object,
        Value::String(inner) => parse_object(inner.as_bytes()).ok_or(FrameError::MalformedPayload)?,
        _ => return Err(FrameError::MalformedPayload),
    };
    Ok(InboundEvent {
        channel: raw.channel,
        payload,
    })
}

/// Encode an outbound event. `None` encodes an empty object.
pub fn encode_event(channel: &str, payload: Option<&JsonObject>) -> Result<String, serde_json::Error> {
    let empty = JsonObject::new();
    serde_json::to_string(&OutboundFrame {
        channel,
        payload: payload.unwrap_or(&empty),
    })
}

/// Parse bytes as a JSON object. Anything else, including valid non-object
/// JSON, is `None`.
pub fn parse_object(bytes: &[u8]) -> Option<JsonObject> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_object_payload() {
        let event = decode_event(r#"{"channel":"chat","payload":{"id":42,"msg":"hi"}}"#).unwrap();
        assert_eq!(event.channel, "chat");
        assert_eq!(event.payload.get("id"), Some(&json!(42)));
    }

    #[test]
    fn test_decode_string_payload() {
        let event = decode_event(r#"{"channel":"chat","payload":"{\"id\":7}"}"#).unwrap();
        assert_eq!(event.payload.get("id"), Some(&json!(7)));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode_event("not json"), Err(FrameError::MalformedFrame(_))));
        assert!(matches!(decode_event(r#"{"payload":{}}"#), Err(FrameError::MalformedFrame(_))));
        assert!(matches!(
            decode_event(r#"{"channel":"c","payload":[1,2]}"#),
            Err(FrameError::MalformedPayload)
        ));
        assert!(matches!(
            decode_event(r#"{"channel":"c","payload":"{oops"}"#),
            Err(FrameError::MalformedPayload)
        ));
        assert!(matches!(decode_event(r#"{"channel":"c"}"#), Err(FrameError::MalformedPayload)));
    }

    #[test]
    fn test_parse_object() {
        assert!(parse_object(br#"{"a":1}"#).is_some());
        assert!(parse_object(b"[1]").is_none());
        assert!(parse_object(b"").is_none());
        assert!(parse_object(b"{").is_none());
    }
}
