//! # pipexpect
//!
//! Drive an interactive command-line program through its stdin and stdout
//! pipes and check its output line by line.
//!
//! A child process is wrapped in a [`ProcessDuplex`], a single stream that
//! reads the child's stdout and writes its stdin. A [`Driver`] then runs a
//! [`Script`] of expect and send steps against it and stops at the first
//! line that differs from the script.
//!
//! ## Quick start
//!
//! ```no_run
//! use pipexpect::{RunOptions, Script, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let script = Script::new()
//!         .expect("Enter your name:")
//!         .send_line("Adrian")
//!         .expect("Welcome Adrian!")
//!         .expect("Are you happy? Y/N")
//!         .send_line("N");
//!
//!     let report = run("bash", &["-c", "./input.sh"], &script, RunOptions::default()).await?;
//!     if let Err(err) = report.exit {
//!         eprintln!("command error: {err}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Driving the pieces by hand
//!
//! [`run`] is a thin wrapper. The same dialogue step by step:
//!
//! ```no_run
//! use pipexpect::{Driver, ProcessDuplex, Script};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (duplex, done) = ProcessDuplex::spawn("bash", &["-c", "./input.sh"])?;
//!     let mut driver = Driver::new(duplex);
//!
//!     driver.run(&Script::new().expect("Enter your name:").send_line("Adrian")).await?;
//!     driver.finish(done).await?;
//!     driver.into_inner().close().await?;
//!     Ok(())
//! }
//! ```
//!
//! Nothing times out. A child that stops writing without exiting blocks the
//! driver on its next read.

pub mod driver;
pub mod duplex;
pub mod error;
pub mod lookup;
pub mod parser;
pub mod runner;

pub use driver::{Driver, LineDiff, Script, State, Step, diff_line};
pub use duplex::{Completion, ProcessDuplex};
pub use error::{CloseError, Error, ExitError, PipeError, Result, SpawnError};
pub use parser::{parse_file, parse_str};
pub use runner::{ExitPolicy, Report, RunOptions, run};
