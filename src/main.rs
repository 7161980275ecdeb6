use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use timediff::{run, TimeDiffError};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: timediff <dataset.csv>";

#[derive(Parser)]
#[command(name = "timediff")]
#[command(
    version,
    about = "Normalize start_time/stop_time columns and append their difference as diff_time"
)]
struct Args {
    /// Input CSV whose first two columns are start_time and stop_time
    dataset: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            process::exit(1);
        }
    };

    // ─── init logging ────────────────────────────────────────────────
    let default_level = if args.verbose {
        "timediff=debug"
    } else {
        "timediff=warn"
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    debug!(dataset = %args.dataset.display(), "startup");

    match run(&args.dataset) {
        Ok(summary) => {
            info!(
                output = %summary.output.display(),
                rows = summary.rows_written,
                dropped = summary.report.total_dropped(),
                "done"
            );
            Ok(())
        }
        Err(e @ (TimeDiffError::NotFound { .. } | TimeDiffError::InvalidFile { .. })) => {
            debug!(error = %e, "rejected input");
            println!("{}", e.diagnostic());
            process::exit(1);
        }
        Err(e @ TimeDiffError::Parse { .. }) => {
            println!("{}: {e}", e.diagnostic());
            process::exit(1);
        }
        Err(e) => Err(e).with_context(|| format!("failed to process {}", args.dataset.display())),
    }
}
