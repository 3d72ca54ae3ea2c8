//! Exposes the command line application.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ipsym_service::config::Config;
use ipsym_service::logging;
use ipsym_service::symbolicate::{SymbolicationRequest, SymbolicationService};
use tracing::level_filters::LevelFilter;

/// Symbolicates an iOS crash report.
///
/// Without `--dsym`, the Xcode archives are searched for the dSYM matching the UUID in the
/// report. Reports from iOS 15 and later are symbolicated with Xcode's `CrashSymbolicator.py`,
/// older ones with `symbolicatecrash`.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Path to the crash report.
    #[arg(value_name = "IPS_FILE")]
    crash_file: PathBuf,

    /// The dSYM bundle to symbolicate with.
    #[arg(long, short, value_name = "PATH")]
    dsym: Option<PathBuf>,

    /// Where to write the symbolicated report.
    ///
    /// Defaults to `<IPS_FILE>_symbolicated.crash` next to the report.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Directories to search for `.xcarchive` bundles, replacing the configured ones.
    #[arg(long, value_name = "PATH", num_args = 1..)]
    archives: Vec<PathBuf>,

    /// Path to your configuration file.
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,
}

impl Cli {
    /// Returns the path to the configuration file.
    fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

/// Runs the main application.
pub fn execute() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::get(cli.config()).context("failed loading config")?;
    if !cli.archives.is_empty() {
        config.archives = cli.archives;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init_logging(&config.logging);

    // the service logs the location of the symbolicated report
    SymbolicationService::new(&config)
        .run(SymbolicationRequest {
            crash_file: cli.crash_file,
            dsym: cli.dsym,
            output: cli.output,
        })
        .context("symbolication failed")?;

    Ok(())
}
