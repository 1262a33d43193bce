//! Gateway Protocol - JSON text frames over WebSocket
//!
//! ## Protocol Overview
//!
//! - **JSON objects** over WebSocket text frames
//! - **Event-tagged** in both directions via the `event` key
//! - **Identity-scoped**: every request carries the session's `user_id`
//!
//! Replies are correlated by tag, not by request ID: `get_groups` is
//! answered by `group_list`, `get_group_messages` by `group_messages`,
//! `send_message` by `message_sent`, `disconnect` by `disconnected`.

pub mod codec;
pub mod schema;
pub mod types;

pub use codec::{decode, decode_request, encode, DecodeError};
pub use schema::{
    events, Envelope, OutboundRequest, RequestKind, DEFAULT_GATEWAY_URL, TIME_WINDOW_FORMAT,
};
pub use types::*;
