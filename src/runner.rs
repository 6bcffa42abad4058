//! One-call execution of a script against a freshly spawned process.

use crate::driver::{Driver, Script};
use crate::duplex::ProcessDuplex;
use crate::error::{CloseError, ExitError, Result};

/// How an abnormal process exit after a successful dialogue is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Keep it in the [`Report`] and log a warning.
    #[default]
    Report,
    /// Fail the run with [`Error::Exit`](crate::Error::Exit).
    Fail,
}

/// Options for [`run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub exit_policy: ExitPolicy,
}

/// Outcome of a dialogue that matched every expected line.
#[derive(Debug)]
pub struct Report {
    /// Number of steps executed.
    pub steps: usize,
    /// Exit outcome of the process.
    pub exit: std::result::Result<(), ExitError>,
    /// Outcome of closing the pipes afterwards.
    pub close: std::result::Result<(), CloseError>,
}

impl Report {
    /// Whether the process exited cleanly and the pipes closed without error.
    pub fn is_clean(&self) -> bool {
        self.exit.is_ok() && self.close.is_ok()
    }
}

/// Spawn `command`, drive `script` against it, then wait for it to exit.
///
/// Returns the first fatal error. On a failed dialogue the process is left
/// running and the pipes are dropped without waiting.
pub async fn run<S: AsRef<str>>(
    command: &str,
    args: &[S],
    script: &Script,
    options: RunOptions,
) -> Result<Report> {
    let (duplex, completion) = ProcessDuplex::spawn(command, args)?;
    let mut driver = Driver::new(duplex);

    driver.run(script).await?;

    let exit = match driver.finish(completion).await {
        Err(err) if options.exit_policy == ExitPolicy::Fail => return Err(err.into()),
        exit => exit,
    };

    let steps = driver.steps_completed();
    let close = driver.get_mut().close().await;
    if let Err(err) = &close {
        tracing::warn!(error = %err, "failed to close process pipes");
    }

    Ok(Report { steps, exit, close })
}
