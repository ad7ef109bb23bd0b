//! Job execution for the relay.
//!
//! Provides:
//! - Command validation and executable resolution
//! - Job spawning with stdout and stderr merged into one stream
//! - Lossy line decoding of that stream

pub mod command;
pub mod job;
pub mod lines;

pub use command::{CommandError, JobCommand};
pub use job::{ExecutorError, Job};
pub use lines::{OutputLines, lossy_lines};
