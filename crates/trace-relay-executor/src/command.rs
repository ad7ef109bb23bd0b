//! Job command validation and executable resolution.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Command validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no command specified")]
    Empty,
    #[error("program name is blank")]
    BlankProgram,
}

/// A validated job command: program plus arguments, passed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    program: String,
    args: Vec<String>,
}

impl JobCommand {
    /// Validate an argv-style command.
    ///
    /// # Errors
    /// Returns error if the command is empty or the program is blank.
    pub fn new<I>(argv: I) -> Result<Self, CommandError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut parts = argv.into_iter().map(Into::into);
        let program = parts.next().ok_or(CommandError::Empty)?;
        if program.trim().is_empty() {
            return Err(CommandError::BlankProgram);
        }
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolve the program to a launchable path.
    ///
    /// Programs containing a path separator are used as given and left for
    /// the spawn to judge. Bare names are looked up on `PATH`.
    #[must_use]
    pub fn resolve(&self) -> Option<PathBuf> {
        let path = Path::new(&self.program);
        if path.components().count() > 1 || path.is_absolute() {
            return Some(path.to_path_buf());
        }
        match which::which(&self.program) {
            Ok(found) => Some(found),
            Err(e) => {
                tracing::debug!(program = %self.program, "PATH lookup failed: {e}");
                None
            }
        }
    }
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(argv.clone()) {
            Ok(joined) => f.write_str(&joined),
            // NUL bytes cannot be quoted
            Err(_) => f.write_str(&argv.collect::<Vec<_>>().join(" ")),
        }
    }
}
