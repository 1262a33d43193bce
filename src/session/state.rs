//! Session state machine
//!
//! ```text
//! Connecting ─open─► AwaitingIdentity ─identity─► Handshaking ─ready─► Ready
//!                                                   │  ▲ qr              │ disconnect
//!                                                   └──┘                 ▼
//!                      Closed ◄────────── disconnected ───────────── Disconnecting
//! ```
//!
//! Any phase drops to `Closed` when the transport goes away.

use std::fmt;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::gateway::protocol::{Group, InboundEvent, OutboundRequest, RequestKind};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Transport not yet open
    Connecting,
    /// Waiting for the operator to supply an identity
    AwaitingIdentity,
    /// `initiate` sent, pairing in progress
    Handshaking,
    /// Backend linked; operator requests allowed
    Ready,
    /// Operator asked to disconnect, waiting for the gateway to confirm
    Disconnecting,
    /// Terminal
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connecting => write!(f, "connecting"),
            Phase::AwaitingIdentity => write!(f, "awaiting identity"),
            Phase::Handshaking => write!(f, "handshaking"),
            Phase::Ready => write!(f, "ready"),
            Phase::Disconnecting => write!(f, "disconnecting"),
            Phase::Closed => write!(f, "closed"),
        }
    }
}

/// Effect of an inbound event on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event accepted, phase unchanged
    Unchanged,
    /// Event accepted, session moved to a new phase
    Entered(Phase),
    /// Event not valid in the current phase; nothing changed
    OutOfPhase(Phase),
}

/// Client-side session
#[derive(Debug, Clone)]
pub struct Session {
    identity: Option<String>,
    phase: Phase,
    cached_groups: Vec<Group>,
    listening: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session for a connection that is still opening
    pub fn new() -> Self {
        Session {
            identity: None,
            phase: Phase::Connecting,
            cached_groups: Vec::new(),
            listening: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Groups from the latest `group_list`
    pub fn groups(&self) -> &[Group] {
        &self.cached_groups
    }

    /// Whether the operator asked to keep waiting for messages
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Transport opened
    pub fn on_open(&mut self) -> Result<()> {
        if self.phase != Phase::Connecting {
            return Err(Error::PreconditionUnmet(format!(
                "connection opened while {}",
                self.phase
            )));
        }
        self.enter(Phase::AwaitingIdentity);
        Ok(())
    }

    /// Set the identity and produce the `initiate` request
    ///
    /// An empty identity leaves the session in `AwaitingIdentity`.
    pub fn supply_identity(&mut self, identity: &str) -> Result<OutboundRequest> {
        if self.phase != Phase::AwaitingIdentity {
            return Err(Error::PreconditionUnmet(format!(
                "identity can only be set while awaiting identity (currently {})",
                self.phase
            )));
        }

        let identity = identity.trim();
        if identity.is_empty() {
            return Err(Error::PreconditionUnmet("User ID cannot be empty.".into()));
        }

        self.identity = Some(identity.to_string());
        self.enter(Phase::Handshaking);
        Ok(OutboundRequest::new(identity, RequestKind::Initiate))
    }

    /// Build a request, enforcing the identity and phase guards
    ///
    /// `initiate` is never built here; [`Session::supply_identity`] is the
    /// only way to produce it.
    pub fn request(&self, kind: RequestKind) -> Result<OutboundRequest> {
        if matches!(kind, RequestKind::Initiate) {
            return Err(Error::PreconditionUnmet(format!(
                "initiate is only sent when the identity is supplied (currently {})",
                self.phase
            )));
        }

        let identity = self
            .identity
            .as_deref()
            .ok_or_else(|| Error::PreconditionUnmet("no user ID has been set".into()))?;

        if kind.requires_ready() && self.phase != Phase::Ready {
            return Err(Error::PreconditionUnmet(format!(
                "{} is only available once the session is ready (currently {})",
                kind.event(),
                self.phase
            )));
        }
        Ok(OutboundRequest::new(identity, kind))
    }

    /// Keep re-prompting after each incoming message
    pub fn mark_listening(&mut self) {
        self.listening = true;
    }

    /// Produce the `disconnect` request and wait for confirmation
    pub fn begin_disconnect(&mut self) -> Result<OutboundRequest> {
        let request = self.request(RequestKind::Disconnect)?;
        self.enter(Phase::Disconnecting);
        Ok(request)
    }

    /// Apply an inbound event
    pub fn apply(&mut self, event: &InboundEvent) -> Transition {
        match event {
            InboundEvent::Qr { .. } => match self.phase {
                Phase::Handshaking => Transition::Unchanged,
                phase => Transition::OutOfPhase(phase),
            },
            InboundEvent::Ready => match self.phase {
                Phase::Handshaking => {
                    self.enter(Phase::Ready);
                    Transition::Entered(Phase::Ready)
                }
                Phase::Ready => Transition::Unchanged,
                phase => Transition::OutOfPhase(phase),
            },
            InboundEvent::GroupList { groups } if self.phase == Phase::Ready => {
                self.cached_groups = groups.clone();
                debug!(count = groups.len(), "Group cache replaced");
                Transition::Unchanged
            }
            event if event.requires_ready() => {
                if self.phase == Phase::Ready {
                    Transition::Unchanged
                } else {
                    Transition::OutOfPhase(self.phase)
                }
            }
            InboundEvent::Disconnected => {
                if self.phase == Phase::Closed {
                    Transition::Unchanged
                } else {
                    self.close();
                    Transition::Entered(Phase::Closed)
                }
            }
            _ => Transition::Unchanged,
        }
    }

    /// Drop to `Closed`, discarding everything the session held
    pub fn close(&mut self) {
        if self.phase != Phase::Closed {
            self.enter(Phase::Closed);
        }
        self.identity = None;
        self.cached_groups.clear();
        self.listening = false;
    }

    fn enter(&mut self, phase: Phase) {
        info!(from = %self.phase, to = %phase, "Session phase changed");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: id.into(),
            name: name.into(),
        }
    }

    fn ready_session() -> Session {
        let mut session = Session::new();
        session.on_open().unwrap();
        session.supply_identity("0547778005").unwrap();
        assert_eq!(session.apply(&InboundEvent::Ready), Transition::Entered(Phase::Ready));
        session
    }

    #[test]
    fn test_identity_produces_initiate() {
        let mut session = Session::new();
        session.on_open().unwrap();

        let request = session.supply_identity("  0547778005 ").unwrap();
        assert_eq!(request, OutboundRequest::new("0547778005", RequestKind::Initiate));
        assert_eq!(session.phase(), Phase::Handshaking);
        assert_eq!(session.identity(), Some("0547778005"));
    }

    #[test]
    fn test_empty_identity_is_refused() {
        let mut session = Session::new();
        session.on_open().unwrap();

        let err = session.supply_identity("   ").unwrap_err();
        assert!(matches!(err, Error::PreconditionUnmet(_)));
        assert_eq!(session.phase(), Phase::AwaitingIdentity);
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn test_no_request_without_identity() {
        let session = Session::new();
        assert!(session.request(RequestKind::GetGroups).is_err());
    }

    #[test]
    fn test_requests_refused_before_ready() {
        let mut session = Session::new();
        session.on_open().unwrap();
        session.supply_identity("u1").unwrap();

        for kind in [RequestKind::GetGroups, RequestKind::GetMessages, RequestKind::Disconnect] {
            assert!(matches!(session.request(kind), Err(Error::PreconditionUnmet(_))));
        }
    }

    #[test]
    fn test_initiate_cannot_be_requested_again() {
        let mut session = Session::new();
        session.on_open().unwrap();
        session.supply_identity("u1").unwrap();

        let err = session.request(RequestKind::Initiate).unwrap_err();
        assert!(matches!(err, Error::PreconditionUnmet(_)));
        assert_eq!(session.phase(), Phase::Handshaking);

        let session = ready_session();
        assert!(matches!(
            session.request(RequestKind::Initiate),
            Err(Error::PreconditionUnmet(_))
        ));
    }

    #[test]
    fn test_qr_refreshes_keep_handshaking() {
        let mut session = Session::new();
        session.on_open().unwrap();
        session.supply_identity("u1").unwrap();

        for code in ["first", "second", "third"] {
            let transition = session.apply(&InboundEvent::Qr {
                qr_code: code.into(),
            });
            assert_eq!(transition, Transition::Unchanged);
            assert_eq!(session.phase(), Phase::Handshaking);
        }
    }

    #[test]
    fn test_group_list_replaces_cache() {
        let mut session = ready_session();

        session.apply(&InboundEvent::GroupList {
            groups: vec![group("g1", "Team"), group("g2", "Family")],
        });
        session.apply(&InboundEvent::GroupList {
            groups: vec![group("g3", "Work")],
        });

        assert_eq!(session.groups(), &[group("g3", "Work")]);
    }

    #[test]
    fn test_group_list_before_ready_is_out_of_phase() {
        let mut session = Session::new();
        session.on_open().unwrap();
        session.supply_identity("u1").unwrap();

        let transition = session.apply(&InboundEvent::GroupList {
            groups: vec![group("g1", "Team")],
        });
        assert_eq!(transition, Transition::OutOfPhase(Phase::Handshaking));
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_disconnect_round_trip() {
        let mut session = ready_session();

        let request = session.begin_disconnect().unwrap();
        assert_eq!(request.event(), "disconnect");
        assert_eq!(session.phase(), Phase::Disconnecting);

        // No more operator requests while the disconnect is pending
        assert!(session.request(RequestKind::GetGroups).is_err());

        assert_eq!(
            session.apply(&InboundEvent::Disconnected),
            Transition::Entered(Phase::Closed)
        );
        assert!(session.is_closed());
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn test_close_discards_session_data() {
        let mut session = ready_session();
        session.apply(&InboundEvent::GroupList {
            groups: vec![group("g1", "Team")],
        });
        session.mark_listening();

        session.close();

        assert!(session.is_closed());
        assert_eq!(session.identity(), None);
        assert!(session.groups().is_empty());
        assert!(!session.is_listening());
    }

    #[test]
    fn test_unrecognized_event_changes_nothing() {
        let mut session = ready_session();
        let transition = session.apply(&InboundEvent::Unrecognized {
            tag: Some("battery".into()),
            payload: serde_json::json!({}),
        });
        assert_eq!(transition, Transition::Unchanged);
        assert!(session.is_ready());
    }
}
