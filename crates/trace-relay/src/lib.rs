//! Command-execution relay.
//!
//! Provides:
//! - `Relay` - Spawn a job and stream its output over a session
//! - `EchoWriter` - Local echo of forwarded lines
//! - `RelayError` - Phase-tagged run failures

pub mod echo;
pub mod relay;

pub use echo::EchoWriter;
pub use relay::{Relay, RelayError};
pub use trace_relay_core::{RelayConfig, RelayMessage};
