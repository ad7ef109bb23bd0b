//! Run a command and stream its output to a remote observer.
//!
//! Usage: trace-relay --url ws://host:port/path --trace-id ID [--command] PROGRAM [ARGS...]

use std::{io, process::ExitCode, time::Duration};

use clap::Parser;
use trace_relay::{Relay, RelayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run a command and relay its output over WebSocket.
#[derive(Debug, Parser)]
#[command(name = "trace-relay", version, about)]
struct Cli {
    /// WebSocket URL of the observer.
    #[arg(long, value_name = "URL")]
    url: String,

    /// Trace ID correlating this run's messages.
    #[arg(long, value_name = "ID")]
    trace_id: String,

    /// Milliseconds to wait after `complete` before closing the connection.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    linger_ms: u64,

    /// Marks the start of the command; accepted for compatibility.
    #[arg(long = "command", hide = true)]
    command_marker: bool,

    /// Command to run. Everything from here on is passed through verbatim.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

impl Cli {
    fn into_config(self) -> RelayConfig {
        RelayConfig::new(self.url, self.trace_id, self.command)
            .with_linger(Duration::from_millis(self.linger_ms))
    }
}

/// Map a job exit code onto a process exit status.
fn exit_status(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(status) => status,
        // Killed by signal N: shells report 128 + N.
        Err(_) if (-127..0).contains(&code) => 128 + code.unsigned_abs() as u8,
        Err(_) => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Cli::parse().into_config();

    match Relay::websocket().run(&config).await {
        Ok(code) => ExitCode::from(exit_status(code)),
        Err(e) => {
            eprintln!("trace-relay: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(1), 1);
        assert_eq!(exit_status(255), 255);
        assert_eq!(exit_status(-9), 137);
        assert_eq!(exit_status(-15), 143);
        assert_eq!(exit_status(256), 1);
        assert_eq!(exit_status(-1000), 1);
    }

    #[test]
    fn test_command_consumes_remaining_args() {
        let cli = Cli::try_parse_from([
            "trace-relay",
            "--url",
            "ws://localhost:9000/ws",
            "--trace-id",
            "t1",
            "--command",
            "ls",
            "-la",
            "--url",
            "x",
        ])
        .unwrap();
        assert!(cli.command_marker);
        let config = cli.into_config();
        assert_eq!(config.address(), "ws://localhost:9000/ws");
        assert_eq!(config.command(), ["ls", "-la", "--url", "x"]);
        assert_eq!(config.linger(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_command_parses_empty() {
        let cli = Cli::try_parse_from(["trace-relay", "--url", "ws://h", "--trace-id", "t", "--linger-ms", "0"])
            .unwrap();
        let config = cli.into_config();
        assert!(config.command().is_empty());
        assert_eq!(config.linger(), Duration::ZERO);
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
