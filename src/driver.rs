//! Line-synchronized scripted dialogue over a duplex stream.
//!
//! A [`Script`] is an ordered list of [`Step`]s. The [`Driver`] runs it
//! against anything that is both [`AsyncRead`] and [`AsyncWrite`], usually a
//! [`ProcessDuplex`](crate::ProcessDuplex):
//!
//! - `Expect` reads exactly one line and compares it, trimmed, to a literal.
//! - `Send` writes bytes verbatim.
//!
//! The first mismatch or I/O error stops the run.

use crate::duplex::Completion;
use crate::error::{Error, ExitError, Result};
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// One action of a scripted dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Read one line and require it to equal this text after trimming.
    Expect(String),
    /// Write these bytes as-is.
    Send(Vec<u8>),
}

impl Step {
    /// An `Expect` step.
    pub fn expect(line: impl Into<String>) -> Self {
        Step::Expect(line.into())
    }

    /// A `Send` step for `text` followed by a newline.
    pub fn send_line(text: impl Into<String>) -> Self {
        let mut bytes = text.into().into_bytes();
        bytes.push(b'\n');
        Step::Send(bytes)
    }

    /// A `Send` step for raw bytes, no terminator added.
    pub fn send(bytes: impl Into<Vec<u8>>) -> Self {
        Step::Send(bytes.into())
    }
}

/// An ordered scripted dialogue.
///
/// ```
/// use pipexpect::Script;
///
/// let script = Script::new()
///     .expect("Enter your name:")
///     .send_line("Adrian")
///     .expect("Welcome Adrian!");
/// assert_eq!(script.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an `Expect` step.
    pub fn expect(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::expect(line));
        self
    }

    /// Append a `Send` step for `text` plus a newline.
    pub fn send_line(mut self, text: impl Into<String>) -> Self {
        self.steps.push(Step::send_line(text));
        self
    }

    /// Append a `Send` step for raw bytes.
    pub fn send(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push(Step::send(bytes));
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<Step>> for Script {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

impl FromIterator<Step> for Script {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Why an expected line did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDiff {
    /// The stream ended (or failed) before a line could be read.
    Missing { expected: String },
    /// A line was read but differs from the expected text.
    Mismatch { expected: String, actual: String },
}

impl LineDiff {
    pub fn expected(&self) -> &str {
        match self {
            LineDiff::Missing { expected } | LineDiff::Mismatch { expected, .. } => expected,
        }
    }

    /// The line actually read, if any.
    pub fn actual(&self) -> Option<&str> {
        match self {
            LineDiff::Missing { .. } => None,
            LineDiff::Mismatch { actual, .. } => Some(actual),
        }
    }
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineDiff::Missing { .. } => f.write_str("expected to read line, but didn't"),
            LineDiff::Mismatch { expected, actual } => {
                write!(f, "-expected +actual\n- {expected:?}\n+ {actual:?}")
            }
        }
    }
}

/// Compare a line read from the process against the expected text.
///
/// `None` for `line` means no line was available. The line is trimmed of
/// surrounding whitespace only; the comparison is exact.
pub fn diff_line(line: Option<&str>, expected: &str) -> Option<LineDiff> {
    match line {
        None => Some(LineDiff::Missing {
            expected: expected.to_string(),
        }),
        Some(line) => {
            let actual = line.trim();
            (actual != expected).then(|| LineDiff::Mismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }
}

/// Where the driver is in its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingLine,
    Sending,
    Done,
    Failed,
}

/// Runs a [`Script`] against a duplex stream, one step at a time.
pub struct Driver<S> {
    stream: S,
    state: State,
    completed: usize,
}

impl<S> Driver<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            state: State::AwaitingLine,
            completed: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of steps that finished successfully.
    pub fn steps_completed(&self) -> usize {
        self.completed
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Execute every step of `script` in order.
    ///
    /// Stops at the first failing step; nothing after it is read or written.
    /// A driver runs one script only.
    pub async fn run(&mut self, script: &Script) -> Result<()> {
        if matches!(self.state, State::Done | State::Failed) {
            return Err(Error::Finished(self.state));
        }

        for (index, step) in script.steps().iter().enumerate() {
            if let Err(err) = self.step(index, step).await {
                self.state = State::Failed;
                tracing::debug!(step = index, error = %err, "script step failed");
                return Err(err);
            }
            self.completed += 1;
        }

        self.state = State::Done;
        tracing::debug!(steps = self.completed, "script complete");
        Ok(())
    }

    async fn step(&mut self, index: usize, step: &Step) -> Result<()> {
        match step {
            Step::Expect(expected) => {
                self.state = State::AwaitingLine;
                let line = self
                    .read_line()
                    .await
                    .map_err(|source| Error::Read { step: index, source })?;
                if let Some(diff) = diff_line(line.as_deref(), expected) {
                    tracing::debug!(step = index, expected = %expected, actual = ?diff.actual(), "line did not match");
                    return Err(Error::Line { step: index, diff });
                }
                tracing::debug!(step = index, line = %expected, "matched");
            }
            Step::Send(bytes) => {
                self.state = State::Sending;
                self.write(bytes)
                    .await
                    .map_err(|source| Error::Write { step: index, source })?;
                tracing::debug!(step = index, bytes = bytes.len(), "sent");
            }
        }
        Ok(())
    }

    /// Read up to and including the next `\n`, one byte at a time so nothing
    /// past the line is consumed.
    ///
    /// Returns `None` on EOF before any byte. A final unterminated line is
    /// still returned.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.stream.read(&mut byte).await {
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => {
                    return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                }
                Ok(_) => line.push(byte[0]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&line).into_owned()))
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Block until the process behind `completion` exits and return its outcome.
    ///
    /// Intended for after [`run`](Self::run) succeeded. An abnormal exit is
    /// logged and returned, not turned into an [`Error`].
    pub async fn finish(&self, completion: Completion) -> std::result::Result<(), ExitError> {
        let outcome = completion.wait().await;
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "process did not exit cleanly");
        }
        outcome
    }
}
