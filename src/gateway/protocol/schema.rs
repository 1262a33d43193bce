//! Gateway protocol schema
//!
//! Defines the wire format for gateway messages. Every frame is a JSON
//! object carrying an `event` tag; outbound frames also carry `user_id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default gateway endpoint
pub const DEFAULT_GATEWAY_URL: &str = "ws://localhost:3000";

/// Layout of the optional time-window bounds on `get_group_messages`
pub const TIME_WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inbound event tags
pub mod events {
    /// Pairing code to scan
    pub const QR: &str = "qr";
    /// Backend session is linked
    pub const READY: &str = "ready";
    /// Group list reply
    pub const GROUP_LIST: &str = "group_list";
    /// Group history reply
    pub const GROUP_MESSAGES: &str = "group_messages";
    /// Single pushed message
    pub const MESSAGE: &str = "message";
    /// Send acknowledgement
    pub const MESSAGE_SENT: &str = "message_sent";
    /// Session ended by the gateway
    pub const DISCONNECTED: &str = "disconnected";

    /// Tags only meaningful once the session is ready
    pub const READY_ONLY: [&str; 4] = [GROUP_LIST, GROUP_MESSAGES, MESSAGE, MESSAGE_SENT];
}

/// Inbound envelope
///
/// `event` and `data` are lifted out of the object; every other top-level
/// key stays in `fields`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    /// Event tag, if the frame carried a string one
    pub event: Option<String>,
    /// Nested payload
    pub data: Option<Value>,
    /// Remaining top-level keys
    pub fields: Map<String, Value>,
}

impl Envelope {
    /// Build an envelope from a decoded JSON object
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let event = match object.remove("event") {
            Some(Value::String(tag)) => Some(tag),
            _ => None,
        };
        let data = object.remove("data");

        Envelope {
            event,
            data,
            fields: object,
        }
    }

    /// The event tag, or an empty string when absent
    pub fn tag(&self) -> &str {
        self.event.as_deref().unwrap_or_default()
    }

    /// Look up a top-level field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The event payload
    ///
    /// Gateways put payloads under `data`, but some events carry them at
    /// the top level, so a missing or non-object `data` falls back to the
    /// remaining top-level fields.
    pub fn payload(&self) -> Value {
        match &self.data {
            Some(data @ Value::Object(_)) => data.clone(),
            _ => Value::Object(self.fields.clone()),
        }
    }
}

/// Outbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Session identity
    pub user_id: String,
    /// Request-specific tag and fields
    #[serde(flatten)]
    pub kind: RequestKind,
}

/// Outbound request kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RequestKind {
    /// Start the backend session (triggers QR pairing)
    Initiate,
    /// List groups the account belongs to
    GetGroups,
    /// Subscribe to new messages
    GetMessages,
    /// Fetch a group's history, optionally bounded
    GetGroupMessages {
        group_id: String,
        #[serde(rename = "startTime", default, skip_serializing_if = "Option::is_none")]
        start_time: Option<String>,
        #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
        end_time: Option<String>,
    },
    /// Send a text message
    SendMessage { recipient: String, message: String },
    /// Ask the gateway to end the session
    Disconnect,
}

impl RequestKind {
    /// Wire tag for this request
    pub fn event(&self) -> &'static str {
        match self {
            RequestKind::Initiate => "initiate",
            RequestKind::GetGroups => "get_groups",
            RequestKind::GetMessages => "get_messages",
            RequestKind::GetGroupMessages { .. } => "get_group_messages",
            RequestKind::SendMessage { .. } => "send_message",
            RequestKind::Disconnect => "disconnect",
        }
    }

    /// Whether this request may only be sent once the session is ready
    pub fn requires_ready(&self) -> bool {
        !matches!(self, RequestKind::Initiate)
    }
}

impl OutboundRequest {
    /// Create a new request for the given identity
    pub fn new(user_id: impl Into<String>, kind: RequestKind) -> Self {
        OutboundRequest {
            user_id: user_id.into(),
            kind,
        }
    }

    /// Wire tag for this request
    pub fn event(&self) -> &'static str {
        self.kind.event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_payload_prefers_data() {
        let object = json!({"event": "group_list", "data": {"groups": []}, "extra": 1});
        let envelope = Envelope::from_object(object.as_object().unwrap().clone());

        assert_eq!(envelope.tag(), "group_list");
        assert_eq!(envelope.payload(), json!({"groups": []}));
        assert_eq!(envelope.field("extra"), Some(&json!(1)));
    }

    #[test]
    fn test_envelope_payload_falls_back_to_top_level() {
        let object = json!({"event": "message_sent", "recipientId": "972500000000"});
        let envelope = Envelope::from_object(object.as_object().unwrap().clone());

        assert_eq!(envelope.payload(), json!({"recipientId": "972500000000"}));
    }

    #[test]
    fn test_non_string_tag_is_absent() {
        let object = json!({"event": 7});
        let envelope = Envelope::from_object(object.as_object().unwrap().clone());
        assert_eq!(envelope.event, None);
        assert_eq!(envelope.tag(), "");
    }

    #[test]
    fn test_group_messages_request_omits_empty_window() {
        let request = OutboundRequest::new(
            "0547778005",
            RequestKind::GetGroupMessages {
                group_id: "g1".into(),
                start_time: None,
                end_time: Some("2024-01-31 23:59:59".into()),
            },
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "user_id": "0547778005",
                "event": "get_group_messages",
                "group_id": "g1",
                "endTime": "2024-01-31 23:59:59"
            })
        );
    }
}
