//! Event dispatcher
//!
//! Routes one inbound frame at a time to the session and reports what the
//! operator should see next. Rendering is left to the caller.

use serde_json::Value;
use tracing::warn;

use crate::gateway::protocol::{codec, ChatMessage, Group, InboundEvent};

use super::state::{Phase, Session, Transition};

/// Default number of characters shown for unrecognized payloads
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// What the operator should see after a frame was handled
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Render a pairing code
    ShowQr(String),
    /// Backend linked
    Ready,
    /// Group list (already cached)
    Groups(Vec<Group>),
    /// Group history, oldest first
    GroupMessages(Vec<ChatMessage>),
    /// A single pushed message
    Message(ChatMessage),
    /// Send acknowledged
    MessageSent(Option<String>),
    /// Gateway ended the session
    Disconnected,
    /// Unknown tag
    Diagnostic { tag: String, preview: String },
    /// Known tag whose payload did not match; `reprompt` is set when the
    /// operator was waiting on a Ready-only reply
    Anomaly {
        tag: String,
        reason: String,
        preview: String,
        reprompt: bool,
    },
    /// Known event arriving in a phase that does not expect it
    OutOfPhase { tag: String, phase: Phase },
    /// Frame was not a JSON object
    Malformed { raw: String, reason: String },
}

impl Reaction {
    /// Whether the operator should be offered the action menu
    pub fn prompts(&self) -> bool {
        match self {
            Reaction::Ready
            | Reaction::Groups(_)
            | Reaction::GroupMessages(_)
            | Reaction::Message(_)
            | Reaction::MessageSent(_) => true,
            Reaction::Anomaly { reprompt, .. } => *reprompt,
            _ => false,
        }
    }

    /// Whether the session is over
    pub fn terminates(&self) -> bool {
        matches!(self, Reaction::Disconnected)
    }
}

/// Routes inbound frames by event tag
#[derive(Debug, Clone)]
pub struct Dispatcher {
    preview_chars: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl Dispatcher {
    pub fn new(preview_chars: usize) -> Self {
        Dispatcher { preview_chars }
    }

    /// Decode and dispatch one raw text frame
    pub fn dispatch(&self, session: &mut Session, frame: &str) -> Reaction {
        match codec::decode(frame) {
            Ok(envelope) => self.dispatch_event(session, InboundEvent::from(envelope)),
            Err(e) => {
                warn!(error = %e, "Discarding malformed frame");
                Reaction::Malformed {
                    raw: frame.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Dispatch an already typed event
    pub fn dispatch_event(&self, session: &mut Session, event: InboundEvent) -> Reaction {
        if let Transition::OutOfPhase(phase) = session.apply(&event) {
            warn!(tag = event.tag(), %phase, "Event arrived out of phase");
            return Reaction::OutOfPhase {
                tag: event.tag().to_string(),
                phase,
            };
        }

        // Ready-only events only get this far while Ready
        let ready_only = event.requires_ready();

        match event {
            InboundEvent::Qr { qr_code } => Reaction::ShowQr(qr_code),
            InboundEvent::Ready => Reaction::Ready,
            InboundEvent::GroupList { groups } => Reaction::Groups(groups),
            InboundEvent::GroupMessages { mut messages } => {
                messages.sort_by_key(|message| message.timestamp);
                Reaction::GroupMessages(messages)
            }
            InboundEvent::Message { message } => Reaction::Message(message),
            InboundEvent::MessageSent { recipient_id } => Reaction::MessageSent(recipient_id),
            InboundEvent::Disconnected => Reaction::Disconnected,
            InboundEvent::Unrecognized { tag, payload } => Reaction::Diagnostic {
                tag: tag.unwrap_or_else(|| "UNKNOWN_EVENT".to_string()),
                preview: self.preview(&payload),
            },
            InboundEvent::Invalid {
                tag,
                reason,
                payload,
            } => {
                warn!(%tag, %reason, "Event payload did not match its tag");
                Reaction::Anomaly {
                    tag,
                    reason,
                    preview: self.preview(&payload),
                    reprompt: ready_only,
                }
            }
        }
    }

    /// Pretty JSON, cut to the configured number of characters
    fn preview(&self, payload: &Value) -> String {
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        pretty.chars().take(self.preview_chars).collect()
    }
}
