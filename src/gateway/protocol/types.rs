//! Gateway protocol types
//!
//! Typed inbound events lifted from raw envelopes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::schema::{events, Envelope};

// ============================================================================
// Reference data
// ============================================================================

/// A group the linked account belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: String,
    /// Display name; absent or null becomes empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Group {
    /// Name for display, with a placeholder for unnamed groups
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

/// A chat message as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "epoch_millis")]
    pub timestamp: i64,
    /// Sender ID
    #[serde(default)]
    pub sender: Option<String>,
    /// Text content
    #[serde(default)]
    pub body: Option<String>,
}

/// Accept any JSON number, truncating fractional milliseconds
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|ms| ms as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", number)))
}

// ============================================================================
// Inbound events
// ============================================================================

/// Inbound event, one variant per known tag
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Pairing code to render
    Qr { qr_code: String },
    /// Backend session is linked
    Ready,
    /// Full group list
    GroupList { groups: Vec<Group> },
    /// Group history
    GroupMessages { messages: Vec<ChatMessage> },
    /// A single pushed message
    Message { message: ChatMessage },
    /// Send acknowledgement
    MessageSent { recipient_id: Option<String> },
    /// Gateway ended the session
    Disconnected,
    /// Tag not in the vocabulary (or missing)
    Unrecognized { tag: Option<String>, payload: Value },
    /// Known tag whose required fields are missing or mistyped
    Invalid {
        tag: String,
        reason: String,
        payload: Value,
    },
}

impl InboundEvent {
    /// Tag this event was decoded from
    pub fn tag(&self) -> &str {
        match self {
            InboundEvent::Qr { .. } => events::QR,
            InboundEvent::Ready => events::READY,
            InboundEvent::GroupList { .. } => events::GROUP_LIST,
            InboundEvent::GroupMessages { .. } => events::GROUP_MESSAGES,
            InboundEvent::Message { .. } => events::MESSAGE,
            InboundEvent::MessageSent { .. } => events::MESSAGE_SENT,
            InboundEvent::Disconnected => events::DISCONNECTED,
            InboundEvent::Unrecognized { tag, .. } => tag.as_deref().unwrap_or("UNKNOWN_EVENT"),
            InboundEvent::Invalid { tag, .. } => tag.as_str(),
        }
    }

    /// Whether this event only makes sense once the session is ready
    ///
    /// An `Invalid` event counts when its tag is one of the Ready-only tags.
    pub fn requires_ready(&self) -> bool {
        match self {
            InboundEvent::GroupList { .. }
            | InboundEvent::GroupMessages { .. }
            | InboundEvent::Message { .. }
            | InboundEvent::MessageSent { .. } => true,
            InboundEvent::Invalid { tag, .. } => events::READY_ONLY.contains(&tag.as_str()),
            _ => false,
        }
    }
}

impl From<Envelope> for InboundEvent {
    fn from(envelope: Envelope) -> Self {
        let Some(tag) = envelope.event.clone() else {
            return InboundEvent::Unrecognized {
                tag: None,
                payload: envelope.payload(),
            };
        };

        match lift(&tag, &envelope) {
            Ok(event) => event,
            Err(reason) => InboundEvent::Invalid {
                tag,
                reason,
                payload: envelope.payload(),
            },
        }
    }
}

fn lift(tag: &str, envelope: &Envelope) -> Result<InboundEvent, String> {
    let payload = envelope.payload();

    let event = match tag {
        events::QR => {
            let qr_code = envelope
                .field("qr_code")
                .or_else(|| payload.get("qr_code"))
                .and_then(Value::as_str)
                .filter(|code| !code.is_empty())
                .ok_or("missing qr_code")?;
            InboundEvent::Qr {
                qr_code: qr_code.to_string(),
            }
        }
        events::READY => InboundEvent::Ready,
        events::GROUP_LIST => InboundEvent::GroupList {
            groups: list_field(&payload, "groups")?,
        },
        events::GROUP_MESSAGES => InboundEvent::GroupMessages {
            messages: list_field(&payload, "messages")?,
        },
        events::MESSAGE => {
            let raw = payload
                .get("message")
                .or_else(|| envelope.field("message"))
                .ok_or("missing message")?;
            let message = ChatMessage::deserialize(raw)
                .map_err(|e| format!("invalid message: {}", e))?;
            InboundEvent::Message { message }
        }
        events::MESSAGE_SENT => InboundEvent::MessageSent {
            recipient_id: payload
                .get("recipientId")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        events::DISCONNECTED => InboundEvent::Disconnected,
        _ => InboundEvent::Unrecognized {
            tag: Some(tag.to_string()),
            payload,
        },
    };

    Ok(event)
}

/// Read a list under `key`; absent or null means empty
fn list_field<T>(payload: &Value, key: &str) -> Result<Vec<T>, String>
where
    T: for<'de> Deserialize<'de>,
{
    match payload.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(raw) => Vec::<T>::deserialize(raw).map_err(|e| format!("invalid {}: {}", key, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> InboundEvent {
        Envelope::from_object(value.as_object().unwrap().clone()).into()
    }

    #[test]
    fn test_group_list_keeps_order() {
        let parsed = event(json!({
            "event": "group_list",
            "data": {"groups": [{"id": "g2", "name": "Zeta"}, {"id": "g1", "name": "Alpha"}]}
        }));

        assert_eq!(
            parsed,
            InboundEvent::GroupList {
                groups: vec![
                    Group { id: "g2".into(), name: "Zeta".into() },
                    Group { id: "g1".into(), name: "Alpha".into() },
                ]
            }
        );
    }

    #[test]
    fn test_group_list_without_groups_is_empty() {
        let parsed = event(json!({"event": "group_list", "data": {}}));
        assert_eq!(parsed, InboundEvent::GroupList { groups: vec![] });
    }

    #[test]
    fn test_qr_reads_top_level_code() {
        let parsed = event(json!({"event": "qr", "qr_code": "2@abc"}));
        assert_eq!(parsed, InboundEvent::Qr { qr_code: "2@abc".into() });
    }

    #[test]
    fn test_qr_without_code_is_invalid() {
        let parsed = event(json!({"event": "qr"}));
        assert!(matches!(parsed, InboundEvent::Invalid { ref tag, .. } if tag == "qr"));
    }

    #[test]
    fn test_message_from_data_or_top_level() {
        let nested = event(json!({
            "event": "message",
            "data": {"message": {"timestamp": 1700000000000_i64, "sender": "a", "body": "hi"}}
        }));
        let flat = event(json!({
            "event": "message",
            "message": {"timestamp": 1700000000000_i64, "sender": "a", "body": "hi"}
        }));

        assert_eq!(nested, flat);
        assert!(matches!(nested, InboundEvent::Message { ref message } if message.body.as_deref() == Some("hi")));
    }

    #[test]
    fn test_message_with_float_timestamp() {
        let parsed = event(json!({
            "event": "message",
            "data": {"message": {"timestamp": 1700000000123.9}}
        }));
        match parsed {
            InboundEvent::Message { message } => {
                assert_eq!(message.timestamp, 1700000000123);
                assert_eq!(message.sender, None);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_message_without_timestamp_is_invalid() {
        let parsed = event(json!({"event": "message", "data": {"message": {"body": "hi"}}}));
        assert!(matches!(parsed, InboundEvent::Invalid { .. }));
    }

    #[test]
    fn test_unknown_and_missing_tags() {
        let unknown = event(json!({"event": "battery", "data": {"level": 3}}));
        assert_eq!(
            unknown,
            InboundEvent::Unrecognized {
                tag: Some("battery".into()),
                payload: json!({"level": 3})
            }
        );

        let untagged = event(json!({"foo": "bar"}));
        assert_eq!(untagged.tag(), "UNKNOWN_EVENT");
    }

    #[test]
    fn test_null_group_name_reads_as_unknown() {
        let parsed = event(json!({
            "event": "group_list",
            "data": {"groups": [{"id": "g2", "name": null}, {"id": "g3"}]}
        }));

        match parsed {
            InboundEvent::GroupList { groups } => {
                assert_eq!(groups.len(), 2);
                assert!(groups.iter().all(|g| g.display_name() == "Unknown"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_ready_only_tag_requires_ready() {
        let invalid_list = event(json!({"event": "group_list", "data": {"groups": "nope"}}));
        assert!(matches!(invalid_list, InboundEvent::Invalid { .. }));
        assert!(invalid_list.requires_ready());

        let invalid_qr = event(json!({"event": "qr"}));
        assert!(!invalid_qr.requires_ready());
    }

    #[test]
    fn test_message_sent_recipient_is_optional() {
        let parsed = event(json!({"event": "message_sent", "data": {}}));
        assert_eq!(parsed, InboundEvent::MessageSent { recipient_id: None });
    }
}
