//! Session module - client-side protocol state
//!
//! - state.rs: phases, identity, cached groups
//! - dispatcher.rs: inbound frame routing
//! - driver.rs: operator menu and request building
//! - operator.rs: seam towards the human operator
//! - client.rs: the serialized session loop

pub mod client;
pub mod dispatcher;
pub mod driver;
pub mod operator;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{SessionClient, SessionEnd, SessionOptions, DEFAULT_USER_ID};
pub use dispatcher::{Dispatcher, Reaction, DEFAULT_PREVIEW_CHARS};
pub use driver::MenuAction;
pub use operator::{Operator, TimeBound};
pub use state::{Phase, Session, Transition};
