//! Run configuration for a single relay invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default grace period between sending `complete` and closing the session.
pub const DEFAULT_LINGER: Duration = Duration::from_secs(1);

/// Everything one relay run needs, built once at the boundary.
///
/// Fields are private so a config cannot change once handed to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    address: String,
    trace_id: String,
    command: Vec<String>,
    #[serde(default = "default_linger")]
    linger: Duration,
}

const fn default_linger() -> Duration {
    DEFAULT_LINGER
}

impl RelayConfig {
    /// Create a config with the default linger.
    #[must_use]
    pub fn new<I>(address: impl Into<String>, trace_id: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            address: address.into(),
            trace_id: trace_id.into(),
            command: command.into_iter().map(Into::into).collect(),
            linger: DEFAULT_LINGER,
        }
    }

    /// Override the grace period after `complete`.
    #[must_use]
    pub const fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    /// Endpoint address (a `ws://` URL for the WebSocket transport).
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Program followed by its arguments. May be empty; the relay rejects that.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    #[must_use]
    pub const fn linger(&self) -> Duration {
        self.linger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = RelayConfig::new("ws://localhost:9000", "t1", ["echo", "hi"]);
        assert_eq!(config.address(), "ws://localhost:9000");
        assert_eq!(config.trace_id(), "t1");
        assert_eq!(config.command(), ["echo".to_string(), "hi".to_string()]);
        assert_eq!(config.linger(), DEFAULT_LINGER);
    }

    #[test]
    fn test_linger_defaults_when_missing() {
        let config: RelayConfig = serde_json::from_str(
            r#"{"address":"ws://x","trace_id":"t","command":["true"]}"#,
        )
        .unwrap();
        assert_eq!(config.linger(), DEFAULT_LINGER);

        let quick = config.with_linger(Duration::ZERO);
        assert_eq!(quick.linger(), Duration::ZERO);
    }
}
