//! Error types for pipexpect.
//!
//! Fatal conditions end up in [`Error`]. The two outcomes that are only
//! reported once a dialogue has finished, [`ExitError`] and [`CloseError`],
//! are separate types so callers can keep them as values.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use crate::driver::LineDiff;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The process could not be found or started.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// A standard stream could not be attached.
    #[error(transparent)]
    Pipe(#[from] PipeError),

    /// Reading the next line failed.
    #[error("expected to read line, but didn't (step {step}): {source}")]
    Read {
        /// Index of the expect step.
        step: usize,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing scripted input failed.
    #[error("failed to write input (step {step}): {source}")]
    Write {
        /// Index of the send step.
        step: usize,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The output diverged from the script.
    #[error("unexpected output at step {step}:\n{diff}")]
    Line {
        /// Index of the expect step.
        step: usize,
        /// What was expected and what was read.
        diff: LineDiff,
    },

    /// The process exited abnormally and the exit policy treats that as fatal.
    #[error(transparent)]
    Exit(#[from] ExitError),

    /// Closing the duplex failed.
    #[error(transparent)]
    Close(#[from] CloseError),

    /// The driver already ran to completion or failed.
    #[error("driver already finished in state {0:?}")]
    Finished(crate::driver::State),
}

impl Error {
    /// The mismatch carried by this error, if it is one.
    #[must_use]
    pub fn line_diff(&self) -> Option<&LineDiff> {
        match self {
            Self::Line { diff, .. } => Some(diff),
            _ => None,
        }
    }
}

/// Errors raised while locating or starting the child process.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The command is not on the executable search path.
    #[error("cannot find {command:?} on the path ({path:?})")]
    NotFound {
        /// The command that was looked up.
        command: String,
        /// Value of `PATH` at lookup time.
        path: String,
    },

    /// The OS refused to start the command.
    #[error("failed to start {command:?}: {source}")]
    Start {
        /// The command that failed to start.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A standard stream of the child could not be attached.
#[derive(Debug, Error)]
#[error("failed to attach {stream} pipe to {command:?}")]
pub struct PipeError {
    /// The command being spawned.
    pub command: String,
    /// `"stdin"` or `"stdout"`.
    pub stream: &'static str,
}

/// The child process did not terminate cleanly.
#[derive(Debug, Error)]
pub enum ExitError {
    /// The process exited with a non-success status.
    #[error("process exited with {0}")]
    Status(ExitStatus),

    /// Waiting on the process failed.
    #[error("failed to wait on process: {0}")]
    Wait(#[source] io::Error),

    /// The waiter task ended without publishing an outcome.
    #[error("process waiter ended without reporting an exit status")]
    Lost,
}

/// Closing one or both pipes failed.
///
/// Both individual outcomes are kept so a partial failure is never hidden.
#[derive(Debug, Error)]
#[error("error closing process - in: {}, out: {}", Outcome(.input), Outcome(.output))]
pub struct CloseError {
    /// Outcome of closing stdin.
    pub input: Option<io::Error>,
    /// Outcome of closing stdout.
    pub output: Option<io::Error>,
}

struct Outcome<'a>(&'a Option<io::Error>);

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => write!(f, "{err}"),
            None => f.write_str("ok"),
        }
    }
}
