//! Transport adapters
//!
//! A transport moves whole text frames in both directions. The session
//! loop owns its transport exclusively, so reads and writes never race.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Full-duplex text frame connection
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Wait for the next text frame; `None` once the peer has closed
    async fn next_frame(&mut self) -> Result<Option<String>>;

    /// Close the connection. Closing twice is not an error.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// WebSocket
// ============================================================================

/// WebSocket client transport
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WebSocketTransport {
    /// Connect to a `ws://` or `wss://` endpoint
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| Error::Transport(format!("Failed to connect to {}: {}", url, e)))?;
        info!(url, status = %response.status(), "WebSocket connected");

        Ok(Self {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        debug!(frame = %text, "Sending frame");
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }

        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    debug!(frame = %text, "Received frame");
                    return Ok(Some(text));
                }
                Ok(Message::Binary(bytes)) => {
                    debug!(len = bytes.len(), "Ignoring binary frame");
                }
                Ok(Message::Close(frame)) => {
                    info!(?frame, "Peer closed the connection");
                    self.closed = true;
                    return Ok(None);
                }
                // Ping/pong replies are handled by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => {
                    let err = Error::from(e);
                    if matches!(err, Error::Closed) {
                        self.closed = true;
                        return Ok(None);
                    }
                    return Err(err);
                }
            }
        }

        self.closed = true;
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(e) => match Error::from(e) {
                Error::Closed => Ok(()),
                other => Err(other),
            },
        }
    }
}

// ============================================================================
// In-process
// ============================================================================

/// Channel-backed transport for embedding a gateway in the same process
pub struct InProcessTransport {
    /// Frames going to the gateway side
    outbound_tx: mpsc::Sender<String>,
    /// Frames coming from the gateway side
    inbound_rx: mpsc::Receiver<String>,
    closed: bool,
}

impl InProcessTransport {
    /// Create a new in-process transport pair
    ///
    /// Returns the transport plus the gateway's ends: a receiver for
    /// frames the client sends and a sender for frames the client reads.
    /// Dropping the sender closes the connection from the gateway side.
    pub fn new_pair(capacity: usize) -> (Self, mpsc::Receiver<String>, mpsc::Sender<String>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);

        let transport = Self {
            outbound_tx,
            inbound_rx,
            closed: false,
        };

        (transport, outbound_rx, inbound_tx)
    }

    /// Whether the client side has closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.outbound_tx.send(text).await.map_err(|_| Error::Closed)
    }

    async fn next_frame(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.inbound_rx.recv().await)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.inbound_rx.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_process_round_trip() {
        let (mut transport, mut gateway_rx, gateway_tx) = InProcessTransport::new_pair(8);

        transport.send_text("ping".into()).await.unwrap();
        assert_eq!(gateway_rx.recv().await.as_deref(), Some("ping"));

        gateway_tx.send("pong".into()).await.unwrap();
        assert_eq!(transport.next_frame().await.unwrap().as_deref(), Some("pong"));

        drop(gateway_tx);
        assert_eq!(transport.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_in_process_refuses_send_after_close() {
        let (mut transport, _gateway_rx, _gateway_tx) = InProcessTransport::new_pair(8);

        transport.close().await.unwrap();
        transport.close().await.unwrap();

        assert!(transport.is_closed());
        assert!(matches!(
            transport.send_text("late".into()).await,
            Err(Error::Closed)
        ));
    }
}
