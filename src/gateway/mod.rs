//! Gateway module - WebSocket connection to the messaging gateway
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  text frames   ┌──────────────────┐
//! │  CLI client  │ ◄────────────► │  Gateway server  │ ◄──► WhatsApp
//! │ (this crate) │  ws://...:3000 │                  │
//! └──────────────┘                └──────────────────┘
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::{
    decode, encode, events, ChatMessage, DecodeError, Envelope, Group, InboundEvent,
    OutboundRequest, RequestKind, DEFAULT_GATEWAY_URL,
};

pub use transport::{InProcessTransport, Transport, WebSocketTransport};
