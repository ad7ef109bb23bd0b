//! Process relay: run a job and stream its output to the observer.

use futures::StreamExt;
use thiserror::Error;
use trace_relay_core::{Connector, RelayConfig, RelayMessage, Session, TransportError};
use trace_relay_executor::{CommandError, ExecutorError, Job, JobCommand};
use trace_relay_transport::WsConnector;

use crate::EchoWriter;

/// Relay error. The message names the phase that failed.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CommandError),
    #[error("connect failed: {0}")]
    Connect(#[source] TransportError),
    #[error("send failed: {0}")]
    Send(#[source] TransportError),
    #[error("spawn failed: {0}")]
    Spawn(#[source] ExecutorError),
    #[error("reading job output failed: {0}")]
    Output(#[source] std::io::Error),
    #[error("waiting for job failed: {0}")]
    Wait(#[source] ExecutorError),
}

impl RelayError {
    /// Short name of the failing phase.
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "validate",
            Self::Connect(_) => "connect",
            Self::Send(_) => "send",
            Self::Spawn(_) => "spawn",
            Self::Output(_) => "output",
            Self::Wait(_) => "wait",
        }
    }
}

/// Runs one job per call and streams its output over a fresh session.
///
/// Messages go out as `auth`, then one `log` per non-empty output line in
/// production order, then `complete`. A run that fails after connecting
/// never sends `complete`, and the session is closed on every path.
pub struct Relay<C> {
    connector: C,
    echo: EchoWriter,
}

impl Relay<WsConnector> {
    /// WebSocket relay echoing to stdout.
    #[must_use]
    pub fn websocket() -> Self {
        Self::new(WsConnector::new(), EchoWriter::stdout())
    }
}

impl<C: Connector> Relay<C> {
    /// Create a relay from a connector and a local echo.
    #[must_use]
    pub const fn new(connector: C, echo: EchoWriter) -> Self {
        Self { connector, echo }
    }

    /// Run the configured command and return its exit code.
    ///
    /// # Errors
    /// Returns error if the command is empty, the session cannot be opened,
    /// a send fails, the job cannot be spawned, or its output cannot be read.
    pub async fn run(&self, config: &RelayConfig) -> Result<i32, RelayError> {
        let command = JobCommand::new(config.command())?;

        tracing::info!(
            trace_id = config.trace_id(),
            "Connecting to {}",
            config.address()
        );
        let mut session = self
            .connector
            .open(config.address())
            .await
            .map_err(RelayError::Connect)?;

        let result = self.drive(&mut session, config, &command).await;

        if let Err(e) = session.close().await {
            tracing::warn!("failed to close session: {e}");
        }
        if let Err(ref e) = result {
            tracing::error!(phase = e.phase(), "relay aborted: {e}");
        }
        result
    }

    async fn drive(
        &self,
        session: &mut C::Session,
        config: &RelayConfig,
        command: &JobCommand,
    ) -> Result<i32, RelayError> {
        session
            .send(&RelayMessage::auth(config.trace_id()))
            .await
            .map_err(RelayError::Send)?;

        tracing::info!("Running command: {command}");
        let mut job = Job::spawn(command).map_err(RelayError::Spawn)?;

        if let Err(e) = self.forward_output(session, &mut job).await {
            // Nobody is listening any more, so the job must not outlive the run.
            if let Err(kill_err) = job.terminate().await {
                tracing::warn!("failed to terminate job: {kill_err}");
            }
            return Err(e);
        }

        let exit_code = job.wait().await.map_err(RelayError::Wait)?;

        session
            .send(&RelayMessage::complete(exit_code))
            .await
            .map_err(RelayError::Send)?;

        let linger = config.linger();
        if !linger.is_zero() {
            tokio::time::sleep(linger).await;
        }

        Ok(exit_code)
    }

    async fn forward_output(&self, session: &mut C::Session, job: &mut Job) -> Result<(), RelayError> {
        let Some(mut lines) = job.take_output() else {
            return Ok(());
        };

        while let Some(line) = lines.next().await {
            let line = line.map_err(RelayError::Output)?;
            let content = line.trim();
            if content.is_empty() {
                continue;
            }

            if let Err(e) = self.echo.line(content).await {
                tracing::warn!("local echo failed: {e}");
            }
            session
                .send(&RelayMessage::log(content))
                .await
                .map_err(RelayError::Send)?;
        }

        Ok(())
    }
}
