//! Error types for the gateway client

use thiserror::Error;

/// Result type alias using the client's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operator typed something the driver cannot use
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Action refused because the session is not in a state that allows it
    #[error("Precondition unmet: {0}")]
    PreconditionUnmet(String),

    /// Terminal prompt failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Connection is already closed
    #[error("Connection closed")]
    Closed,
}

impl Error {
    /// Check if the session can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::PreconditionUnmet(_))
    }

    /// Check if error is a client error (bad config or operator input)
    ///
    /// The CLI reports these with a usage exit code.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidInput(_) | Error::PreconditionUnmet(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => Error::Closed,
            other => Error::Transport(other.to_string()),
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::InvalidInput("x".into()).is_recoverable());
        assert!(Error::PreconditionUnmet("x".into()).is_recoverable());
        assert!(!Error::Closed.is_recoverable());
        assert!(!Error::Transport("reset".into()).is_recoverable());
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::Config("bad url".into()).is_client_error());
        assert!(!Error::Config("bad url".into()).is_recoverable());
        assert!(!Error::Transport("refused".into()).is_client_error());
        assert!(!Error::Prompt("eof".into()).is_client_error());
    }

    #[test]
    fn test_closed_socket_maps_to_closed() {
        let err: Error = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, Error::Closed));
    }
}
