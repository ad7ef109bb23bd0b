//! Core abstractions for relaying a command's output to a remote observer.
//!
//! This crate provides the fundamental building blocks:
//! - `RelayMessage` - Typed wire message enum
//! - `RelayConfig` - Immutable per-run configuration record
//! - `Connector` and `Session` transport traits

pub mod config;
pub mod message;
pub mod traits;

pub use config::RelayConfig;
pub use message::RelayMessage;
pub use traits::{Connector, Session, TransportError};
