//! Command-line arguments and log setup.

use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// slircbot - Straylight IRC Bot
#[derive(Debug, Parser)]
#[command(name = "slircbot", version, about, long_about = None)]
pub struct Cli {
    /// Append logs to this file instead of stderr
    #[arg(short, long, value_name = "PATH")]
    pub logfile: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(value_name = "CONFIG", default_value = "slircbot.toml")]
    pub config: PathBuf,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls the filter (default `info`). With a log file, output
/// is appended without ANSI colours.
pub fn init_tracing(logfile: Option<&PathBuf>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logfile {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
