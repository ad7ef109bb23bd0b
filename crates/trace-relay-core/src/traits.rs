//! Core traits for the transport session.

use async_trait::async_trait;
use thiserror::Error;

use crate::RelayMessage;

/// Boxed error from a concrete transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: BoxError,
    },
    #[error("cannot serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Write(#[source] BoxError),
    #[error("session is closed")]
    Closed,
}

/// One open connection to the observer.
///
/// Sends take `&mut self`: a session has a single writer and messages go out
/// in call order.
#[async_trait]
pub trait Session: Send {
    /// Serialize and transmit one message, returning once it has been flushed.
    async fn send(&mut self, message: &RelayMessage) -> Result<(), TransportError>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens sessions to an address.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: Session;

    /// Establish a connection. Never retries.
    async fn open(&self, address: &str) -> Result<Self::Session, TransportError>;
}
