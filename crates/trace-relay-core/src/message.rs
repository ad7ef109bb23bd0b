//! Wire protocol between the relay and the remote observer.

use serde::{Deserialize, Serialize};

/// Message sent from the relay to the observer.
///
/// Serialized as a JSON object tagged by `type`. A run sends exactly one
/// `Auth` first, any number of `Log`s, and exactly one `Complete` last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Identifies the run to the observer.
    Auth { trace_id: String },
    /// One trimmed, non-empty line of job output.
    Log { content: String },
    /// Job terminated with this exit status.
    Complete { exit_code: i32 },
}

impl RelayMessage {
    /// Create the handshake message.
    #[must_use]
    pub fn auth(trace_id: impl Into<String>) -> Self {
        Self::Auth {
            trace_id: trace_id.into(),
        }
    }

    /// Create an output line message.
    #[must_use]
    pub fn log(content: impl Into<String>) -> Self {
        Self::Log {
            content: content.into(),
        }
    }

    /// Create the completion message.
    #[must_use]
    pub const fn complete(exit_code: i32) -> Self {
        Self::Complete { exit_code }
    }

    /// Wire tag of this message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Log { .. } => "log",
            Self::Complete { .. } => "complete",
        }
    }

    /// Serialize to the JSON text sent on the wire.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
