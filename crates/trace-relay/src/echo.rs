//! Local echo of forwarded output lines.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Line writer for the local observer.
#[derive(Clone)]
pub struct EchoWriter {
    writer: Arc<Mutex<BufWriter<Box<dyn AsyncWrite + Send + Unpin>>>>,
}

impl EchoWriter {
    /// Create a new echo writer.
    #[must_use]
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(BufWriter::new(Box::new(writer)))),
        }
    }

    /// Echo to the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Discard everything.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(tokio::io::sink())
    }

    /// Write one line and flush it.
    ///
    /// # Errors
    /// Returns error if write fails.
    pub async fn line(&self, line: &str) -> Result<(), std::io::Error> {
        let mut guard = self.writer.lock().await;
        guard.write_all(line.as_bytes()).await?;
        guard.write_all(b"\n").await?;
        guard.flush().await?;
        Ok(())
    }
}

impl Default for EchoWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn test_lines_are_newline_terminated() {
        let (local, mut remote) = tokio::io::duplex(64);
        let echo = EchoWriter::new(local);
        echo.line("first").await.unwrap();
        echo.line("second").await.unwrap();
        drop(echo);

        let mut out = String::new();
        remote.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "first\nsecond\n");
    }
}
