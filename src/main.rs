use anyhow::{Context, Result};
use clap::Parser;
use pipexpect::{ExitPolicy, RunOptions, parse_file, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pipexpect",
    about = "Run a scripted dialogue against a program's stdin/stdout and check every line",
    version
)]
struct Args {
    /// Path to the dialogue script
    #[arg(short, long)]
    script: String,

    /// Command to run
    #[arg(short, long)]
    command: String,

    /// Fail when the program exits unsuccessfully after the dialogue matched
    #[arg(long)]
    strict_exit: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Arguments to pass to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let script = parse_file(&args.script)
        .with_context(|| format!("Failed to parse script file: {}", args.script))?;

    let options = RunOptions {
        exit_policy: if args.strict_exit {
            ExitPolicy::Fail
        } else {
            ExitPolicy::Report
        },
    };

    let report = match run(&args.command, &args.args, &script, options).await {
        Ok(report) => report,
        Err(err) => {
            match err.line_diff() {
                Some(diff) => tracing::error!(diff = %diff, "unexpected output"),
                None => tracing::error!(error = %err, "dialogue failed"),
            }
            return Err(err).context("Failed to run script");
        }
    };

    if let Err(err) = &report.exit {
        tracing::error!(error = %err, "command error");
    }
    tracing::info!(steps = report.steps, "dialogue matched");
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
