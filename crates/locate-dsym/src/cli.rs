//! Exposes the command line application.
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use ipsym_service::config::Config;
use ipsym_service::dsym::DsymLocator;
use ipsym_service::logging;
use ipsym_service::tools::run_tool;
use tracing::level_filters::LevelFilter;

/// Finds the dSYM bundle with the given UUID in Xcode archives.
///
/// The directory containing the found bundle is revealed with `open`.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// The UUID of the binary, as printed by `dwarfdump --uuid`.
    #[arg(value_name = "UUID", required_unless_present = "list")]
    uuid: Option<String>,

    /// Directories to search for `.xcarchive` bundles, replacing the configured ones.
    #[arg(long, value_name = "PATH", num_args = 1..)]
    archives: Vec<PathBuf>,

    /// Print the UUID and path of every archived dSYM instead of searching.
    #[arg(long)]
    list: bool,

    /// Only print the path of the found dSYM.
    #[arg(long)]
    no_open: bool,

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
        config.archives = cli.archives.clone();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init_logging(&config.logging);

    let locator = DsymLocator::from_config(&config);

    if cli.list {
        for candidate in locator.candidates() {
            println!("{} {}", candidate.uuid, style(candidate.path.display()).cyan());
        }
        return Ok(());
    }

    let uuid = cli.uuid.as_deref().context("no UUID given")?;
    let dsym = locator
        .find(uuid)
        .with_context(|| format!("no dSYM found for UUID {uuid}"))?;
    println!("Found dSYM at: {}", style(dsym.display()).cyan());

    if !cli.no_open {
        reveal(&config.tools.open, &dsym);
    }

    Ok(())
}

/// Opens the directory containing `dsym`.
fn reveal(open: &Path, dsym: &Path) {
    let dir = dsym.parent().unwrap_or(dsym);
    if let Err(error) = run_tool(Command::new(open).arg(dir)) {
        tracing::warn!("Could not open {}: {}", dir.display(), error);
    }
}
