//! A child process's stdin and stdout joined into one duplex stream.

use crate::error::{CloseError, Error, ExitError, PipeError, Result, SpawnError};
use crate::lookup::find_executable;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::oneshot;

/// Reads from the child's stdout and writes to its stdin.
///
/// Both handles belong to the same child. The child itself is owned by a
/// background task that reports its exit through [`Completion`]; closing the
/// duplex does not terminate it.
#[derive(Debug)]
pub struct ProcessDuplex {
    input: Option<ChildStdin>,
    output: Option<ChildStdout>,
    pid: Option<u32>,
}

/// One-shot notification of the child's exit outcome.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<std::result::Result<(), ExitError>>,
}

impl ProcessDuplex {
    /// Start `command` with `args` and return the duplex and its completion signal.
    ///
    /// The process starts immediately. stderr is inherited.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: AsRef<str>>(command: &str, args: &[S]) -> Result<(Self, Completion)> {
        let program = find_executable(command)?;

        let mut cmd = Command::new(&program);
        cmd.args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|source| SpawnError::Start {
            command: command.to_string(),
            source,
        })?;

        let (input, output) = match (child.stdin.take(), child.stdout.take()) {
            (Some(input), Some(output)) => (input, output),
            (input, _) => {
                let _ = child.start_kill();
                let stream = if input.is_none() { "stdin" } else { "stdout" };
                return Err(Error::Pipe(PipeError {
                    command: command.to_string(),
                    stream,
                }));
            }
        };

        let pid = child.id();
        tracing::debug!(command, program = %program.display(), ?pid, "spawned process");

        let completion = Completion::watch(child);
        let duplex = ProcessDuplex {
            input: Some(input),
            output: Some(output),
            pid,
        };
        Ok((duplex, completion))
    }

    /// OS process id of the child, if it was still running when spawned.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Close stdin, then stdout.
    ///
    /// Both are attempted even if the first fails. Closing a handle that is
    /// already closed counts as a failure for that handle.
    pub async fn close(&mut self) -> std::result::Result<(), CloseError> {
        let input = match self.input.take() {
            Some(mut stdin) => stdin.shutdown().await.err(),
            None => Some(closed("stdin")),
        };
        let output = match self.output.take() {
            Some(stdout) => {
                drop(stdout);
                None
            }
            None => Some(closed("stdout")),
        };

        if input.is_some() || output.is_some() {
            return Err(CloseError { input, output });
        }
        tracing::debug!(pid = ?self.pid, "closed process pipes");
        Ok(())
    }
}

fn closed(stream: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotConnected,
        format!("{stream} already closed"),
    )
}

impl AsyncRead for ProcessDuplex {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.output.as_mut() {
            Some(out) => Pin::new(out).poll_read(cx, buf),
            None => Poll::Ready(Err(closed("stdout"))),
        }
    }
}

impl AsyncWrite for ProcessDuplex {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.input.as_mut() {
            Some(input) => Pin::new(input).poll_write(cx, buf),
            None => Poll::Ready(Err(closed("stdin"))),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.input.as_mut() {
            Some(input) => Pin::new(input).poll_flush(cx),
            None => Poll::Ready(Err(closed("stdin"))),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.input.as_mut() {
            Some(input) => Pin::new(input).poll_shutdown(cx),
            None => Poll::Ready(Err(closed("stdin"))),
        }
    }
}

impl Completion {
    /// Hand `child` to a background task that publishes its exit outcome once.
    fn watch(mut child: Child) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = match child.wait().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(ExitError::Status(status)),
                Err(err) => Err(ExitError::Wait(err)),
            };
            // Nobody listening is fine.
            let _ = tx.send(outcome);
        });
        Completion { rx }
    }

    /// Wait for the child to exit.
    pub async fn wait(self) -> std::result::Result<(), ExitError> {
        self.rx.await.unwrap_or(Err(ExitError::Lost))
    }
}
