//! Transport layer for delivering relay messages.
//!
//! Provides:
//! - WebSocket connector and session (`ws://` endpoints)

pub mod websocket;

pub use websocket::{WsConnector, WsSession};
