//! Session loop
//!
//! One task owns the session, the transport and the operator. Each pass
//! waits for exactly one inbound frame, dispatches it, and, when the
//! reaction calls for it, blocks on the operator before reading again.

use tracing::{debug, error, info};

use crate::display;
use crate::error::{Error, Result};
use crate::gateway::protocol::{codec, OutboundRequest};
use crate::gateway::transport::Transport;

use super::dispatcher::{Dispatcher, DEFAULT_PREVIEW_CHARS};
use super::driver;
use super::operator::Operator;
use super::state::Session;

/// Default identity offered at the identity prompt
pub const DEFAULT_USER_ID: &str = "0547778005";

/// Knobs for one session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Identity used when the operator just presses enter
    pub default_user_id: String,
    /// Characters of payload shown for unrecognized events
    pub preview_chars: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            default_user_id: DEFAULT_USER_ID.to_string(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Gateway sent `disconnected`
    Disconnected,
    /// No usable identity; the client closed the connection
    IdentityRefused,
    /// Transport closed without a `disconnected` event
    ConnectionLost,
}

impl SessionEnd {
    /// Whether the process should report success
    pub fn is_graceful(&self) -> bool {
        matches!(self, SessionEnd::Disconnected | SessionEnd::IdentityRefused)
    }
}

/// Drives one session over an open transport
pub struct SessionClient<T, O> {
    transport: T,
    operator: O,
    session: Session,
    dispatcher: Dispatcher,
    options: SessionOptions,
}

impl<T, O> SessionClient<T, O>
where
    T: Transport,
    O: Operator,
{
    /// Create a client for a transport that has just opened
    pub fn new(transport: T, operator: O, options: SessionOptions) -> Self {
        SessionClient {
            transport,
            operator,
            session: Session::new(),
            dispatcher: Dispatcher::new(options.preview_chars),
            options,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until the gateway disconnects or the transport goes away
    pub async fn run(&mut self) -> Result<SessionEnd> {
        let result = self.run_inner().await;
        if let Err(ref e) = result {
            error!(error = %e, phase = %self.session.phase(), "Session aborted");
        }
        self.session.close();
        result
    }

    async fn run_inner(&mut self) -> Result<SessionEnd> {
        self.session.on_open()?;
        self.operator.info("Connected to the server.");

        if !self.handshake().await? {
            return Ok(SessionEnd::IdentityRefused);
        }

        loop {
            let Some(frame) = self.transport.next_frame().await? else {
                info!("Transport closed by peer");
                self.operator.warn("Connection closed by the server.");
                return Ok(SessionEnd::ConnectionLost);
            };

            let reaction = self.dispatcher.dispatch(&mut self.session, &frame);
            debug!(?reaction, "Frame dispatched");
            self.operator.show(&reaction);

            if reaction.terminates() {
                self.transport.close().await?;
                return Ok(SessionEnd::Disconnected);
            }

            if reaction.prompts() && self.session.is_ready() {
                let request = driver::next_request(&mut self.session, &mut self.operator).await?;
                self.send(request).await?;
            }
        }
    }

    /// Ask for the identity and send `initiate`; `false` if refused
    async fn handshake(&mut self) -> Result<bool> {
        let default = self.options.default_user_id.clone();
        let typed = self.operator.identity(&default).await?;
        let identity = if typed.trim().is_empty() {
            default
        } else {
            typed
        };

        match self.session.supply_identity(&identity) {
            Ok(request) => {
                self.send(request).await?;
                Ok(true)
            }
            Err(Error::PreconditionUnmet(reason)) => {
                self.operator.warn(&reason);
                self.transport.close().await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn send(&mut self, request: OutboundRequest) -> Result<()> {
        self.transport.send_text(codec::encode(&request)?).await?;
        self.operator.info(&display::describe_request(&request));
        Ok(())
    }
}
