//! Spawned job with a merged output stream.

use std::{io, process::ExitStatus};

use command_group::{AsyncCommandGroup, AsyncGroupChild};
use thiserror::Error;
use tokio::process::Command;

use crate::{JobCommand, OutputLines, lossy_lines};

/// Executor error.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("cannot launch {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ExecutorError {
    fn from_spawn(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::ExecutableNotFound(program.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(program.to_string()),
            _ => Self::SpawnFailed {
                program: program.to_string(),
                source,
            },
        }
    }
}

/// A running job in its own process group.
///
/// Standard output and standard error share one pipe, so lines keep the
/// order in which the job wrote them.
pub struct Job {
    child: AsyncGroupChild,
    output: Option<OutputLines>,
    exit_code: Option<i32>,
}

impl Job {
    /// Spawn the command. Stdin is inherited.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns error if the executable cannot be found or launched.
    pub fn spawn(command: &JobCommand) -> Result<Self, ExecutorError> {
        let executable = command
            .resolve()
            .ok_or_else(|| ExecutorError::ExecutableNotFound(command.program().to_string()))?;

        tracing::debug!(
            program = command.program(),
            executable = %executable.display(),
            "resolved executable"
        );

        let mut cmd = Command::new(&executable);
        cmd.args(command.args());

        let (child, output) = spawn_merged(cmd)
            .map_err(|e| ExecutorError::from_spawn(command.program(), e))?;

        tracing::info!(pid = ?child.id(), "job started");

        Ok(Self {
            child,
            output: Some(output),
            exit_code: None,
        })
    }

    /// Process id, while the job has not been reaped.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take the merged output stream. Returns `None` after the first call.
    pub fn take_output(&mut self) -> Option<OutputLines> {
        self.output.take()
    }

    /// Wait for the job to exit and return its exit code.
    ///
    /// On Unix a job killed by signal `N` reports `-N`.
    ///
    /// # Errors
    /// Returns error if waiting on the process fails.
    pub async fn wait(&mut self) -> Result<i32, ExecutorError> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        let status = self.child.wait().await?;
        let code = exit_code(status);
        self.exit_code = Some(code);
        tracing::info!(exit_code = code, "job exited");
        Ok(code)
    }

    /// Kill the whole process group and reap it.
    ///
    /// # Errors
    /// Returns error if the group cannot be signalled or waited on.
    pub async fn terminate(&mut self) -> Result<i32, ExecutorError> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        // Already exited but not reaped: the kill fails, the wait still succeeds.
        if let Err(e) = self.child.start_kill() {
            tracing::debug!("kill failed: {e}");
        }
        self.wait().await
    }
}

#[cfg(unix)]
fn spawn_merged(mut cmd: Command) -> io::Result<(AsyncGroupChild, OutputLines)> {
    use std::os::fd::OwnedFd;

    use tokio::net::unix::pipe;

    let (reader, writer) = io::pipe()?;
    cmd.stdout(writer.try_clone()?).stderr(writer);
    let child = cmd.group_spawn()?;
    // Drop the parent's copies of the write end, or end-of-input never arrives.
    drop(cmd);

    let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok((child, lossy_lines(receiver)))
}

#[cfg(not(unix))]
fn spawn_merged(mut cmd: Command) -> io::Result<(AsyncGroupChild, OutputLines)> {
    use std::process::Stdio;

    use futures::StreamExt;

    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.group_spawn()?;
    let stdout = child
        .inner()
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout not captured"))?;
    let stderr = child
        .inner()
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr not captured"))?;

    let merged = futures::stream::select(lossy_lines(stdout), lossy_lines(stderr)).boxed();
    Ok((child, merged))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    fn sh(script: &str) -> JobCommand {
        JobCommand::new(["sh", "-c", script]).unwrap()
    }

    async fn run_to_end(command: &JobCommand) -> (Vec<String>, i32) {
        let mut job = Job::spawn(command).unwrap();
        let lines: Vec<String> = job.take_output().unwrap().try_collect().await.unwrap();
        let code = job.wait().await.unwrap();
        (lines, code)
    }

    #[tokio::test]
    async fn test_stdout_and_stderr_share_one_stream() {
        let (lines, code) = run_to_end(&sh("echo out; echo err >&2; echo again")).await;
        assert_eq!(lines, ["out", "err", "again"]);
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_exit_code_forwarded() {
        let (lines, code) = run_to_end(&sh("exit 3")).await;
        assert!(lines.is_empty());
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_signal_exit_is_negative() {
        let (_, code) = run_to_end(&sh("kill -9 $$")).await;
        assert_eq!(code, -9);
    }

    #[tokio::test]
    async fn test_wait_is_cached() {
        let mut job = Job::spawn(&sh("exit 7")).unwrap();
        drop(job.take_output());
        assert!(job.take_output().is_none());
        assert_eq!(job.wait().await.unwrap(), 7);
        assert_eq!(job.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let command = JobCommand::new(["definitely-not-a-real-program-7f3a"]).unwrap();
        let err = Job::spawn(&command).err().unwrap();
        assert!(matches!(err, ExecutorError::ExecutableNotFound(ref p) if p == "definitely-not-a-real-program-7f3a"));

        let command = JobCommand::new(["/no/such/dir/prog"]).unwrap();
        let err = Job::spawn(&command).err().unwrap();
        assert!(matches!(err, ExecutorError::ExecutableNotFound(_)));
    }

    #[tokio::test]
    async fn test_not_executable() {
        let command = JobCommand::new(["/dev/null"]).unwrap();
        let err = Job::spawn(&command).err().unwrap();
        assert!(matches!(err, ExecutorError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_terminate_kills_group() {
        let mut job = Job::spawn(&sh("sleep 30 & wait")).unwrap();
        assert!(job.id().is_some());
        let code = job.terminate().await.unwrap();
        assert_eq!(code, -9);

        // The background sleep held the pipe; killing the group releases it.
        let lines: Vec<String> = job.take_output().unwrap().try_collect().await.unwrap();
        assert!(lines.is_empty());
    }
}
