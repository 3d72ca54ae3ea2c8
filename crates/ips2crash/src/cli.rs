//! Exposes the command line application.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use ipsym_service::config::Config;
use ipsym_service::logging;
use tracing::level_filters::LevelFilter;

/// Converts an `.ips` crash report into a `.crash` file.
///
/// The output is written next to the input. Without an explicit name, it is named after the
/// crashed app and the time of the crash.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Path to the `.ips` file.
    #[arg(value_name = "IPS_FILE")]
    ips_file: PathBuf,

    /// Name of the `.crash` file to write.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

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
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init_logging(&config.logging);

    if !cli.ips_file.is_file() {
        anyhow::bail!("File not found: {}", cli.ips_file.display());
    }

    let crash_file = ipsym_report::convert_ips_file(&cli.ips_file, cli.output.as_deref())
        .with_context(|| format!("failed to convert {}", cli.ips_file.display()))?;

    println!(
        "Successfully converted to: {}",
        style(crash_file.display()).cyan()
    );

    Ok(())
}
