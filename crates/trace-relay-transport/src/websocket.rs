//! WebSocket transport to the remote observer.

use async_trait::async_trait;
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{Error as WsError, Message},
};
use trace_relay_core::{Connector, RelayMessage, Session, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
    /// Create a new connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Session = WsSession;

    async fn open(&self, address: &str) -> Result<WsSession, TransportError> {
        let (stream, response) = tokio_tungstenite::connect_async(address)
            .await
            .map_err(|e| TransportError::Connect {
                address: address.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!(address, status = %response.status(), "WebSocket connected");

        Ok(WsSession {
            address: address.to_string(),
            stream: Some(stream),
        })
    }
}

/// One WebSocket connection. Each message is a JSON text frame.
pub struct WsSession {
    address: String,
    stream: Option<WsStream>,
}

impl WsSession {
    /// Address this session was opened to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether `close` has not run yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl Session for WsSession {
    async fn send(&mut self, message: &RelayMessage) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        let json = message.to_json()?;

        tracing::trace!(kind = message.kind(), "sending message");

        // `SinkExt::send` flushes, so frames are never coalesced.
        stream
            .send(Message::Text(json))
            .await
            .map_err(|e| TransportError::Write(Box::new(e)))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        match stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                tracing::debug!(address = %self.address, "WebSocket closed");
                Ok(())
            }
            Err(e) => Err(TransportError::Write(Box::new(e))),
        }
    }
}
