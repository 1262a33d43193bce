//! Operator seam
//!
//! Everything the session needs from the human at the keyboard. The
//! terminal implementation lives in [`crate::console`]; tests script it.

use async_trait::async_trait;

use crate::error::Result;
use crate::gateway::protocol::Group;

use super::dispatcher::Reaction;
use super::state::Session;

/// Which end of the time window is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Start,
    End,
}

/// Input and output towards the operator
///
/// Input methods return the raw text typed; validation is the driver's job.
#[async_trait]
pub trait Operator: Send {
    /// Ask for the session identity
    async fn identity(&mut self, default: &str) -> Result<String>;

    /// Show the action menu and read a choice
    async fn menu_choice(&mut self, session: &Session) -> Result<String>;

    /// List groups and read a 1-based index
    async fn group_choice(&mut self, groups: &[Group]) -> Result<String>;

    /// Read one end of the optional time window
    async fn time_bound(&mut self, bound: TimeBound) -> Result<String>;

    /// Read the recipient of an outgoing message
    async fn recipient(&mut self) -> Result<String>;

    /// Read the body of an outgoing message
    async fn message_body(&mut self) -> Result<String>;

    /// Present the outcome of an inbound frame
    fn show(&mut self, reaction: &Reaction);

    /// Status line
    fn info(&mut self, text: &str);

    /// Refusal or input problem
    fn warn(&mut self, text: &str);
}
