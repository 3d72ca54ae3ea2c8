//! Symbolicating crash reports with Apple's tools.
//!
//! Reports from iOS 15 and later are handed to `CrashSymbolicator.py`, which ships with Xcode 15.
//! Older reports, and any report on a machine without that script, go through the legacy
//! `symbolicatecrash` script.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use ipsym_report::CrashFileInfo;
use thiserror::Error;

use crate::config::{Config, Tools};
use crate::dsym::{DsymLocator, Dwarfdump, UuidReader};
use crate::tools::{ToolError, ToolOutput, run_tool};

/// The first iOS major version symbolicated with `CrashSymbolicator.py`.
pub const CRASH_SYMBOLICATOR_MIN_OS: u32 = 15;

/// The external program performing the symbolication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbolicator {
    /// Xcode's `CrashSymbolicator.py`, which writes the output file itself.
    CrashSymbolicator,
    /// The legacy `symbolicatecrash` script, which prints to stdout.
    SymbolicateCrash,
}

impl Symbolicator {
    /// Picks the tool for a report from the given OS version.
    ///
    /// Reports with an unknown OS version use the legacy tool.
    pub fn for_os_version(os_version: Option<&str>) -> Self {
        match os_version.and_then(ipsym_report::os_major_version) {
            Some(major) if major >= CRASH_SYMBOLICATOR_MIN_OS => Self::CrashSymbolicator,
            _ => Self::SymbolicateCrash,
        }
    }

    /// Whether this is the Xcode 15 tool.
    pub fn is_modern(self) -> bool {
        self == Self::CrashSymbolicator
    }
}

impl fmt::Display for Symbolicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrashSymbolicator => f.write_str("CrashSymbolicator"),
            Self::SymbolicateCrash => f.write_str("symbolicatecrash"),
        }
    }
}

/// An error symbolicating a crash report.
#[derive(Debug, Error)]
pub enum SymbolicateError {
    /// The crash report does not exist.
    #[error("crash file not found: {}", .0.display())]
    CrashFileNotFound(PathBuf),
    /// An explicitly given dSYM does not exist.
    #[error("specified dSYM file not found: {}", .0.display())]
    DsymNotFound(PathBuf),
    /// No dSYM was given and the report has no UUID to search for.
    #[error("could not extract UUID from crash file")]
    MissingUuid,
    /// None of the archived dSYMs has the UUID of the report.
    #[error("could not find matching dSYM file for UUID {0}")]
    NoMatchingDsym(String),
    /// The symbolication tool is not installed.
    #[error("symbolication tool not found at {}", .0.display())]
    ToolNotFound(PathBuf),
    /// The symbolication tool failed.
    #[error("failed to run {tool}")]
    Tool {
        /// The tool that failed.
        tool: Symbolicator,
        /// The underlying error.
        #[source]
        source: ToolError,
    },
    /// The symbolicated report could not be written.
    #[error("failed to write {}", .path.display())]
    WriteOutput {
        /// The output file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// What to symbolicate, and where to put the result.
#[derive(Clone, Debug)]
pub struct SymbolicationRequest {
    /// The crash report.
    pub crash_file: PathBuf,
    /// The dSYM to use. When absent, the archives are searched for one.
    pub dsym: Option<PathBuf>,
    /// The output file, see [`default_output_path`].
    pub output: Option<PathBuf>,
}

/// The output file used when none is given: `<report>_symbolicated.crash`.
pub fn default_output_path(crash_file: &Path) -> PathBuf {
    let mut output = crash_file.with_extension("").into_os_string();
    output.push("_symbolicated.crash");
    PathBuf::from(output)
}

/// Runs the symbolication of single crash reports.
#[derive(Debug)]
pub struct SymbolicationService<R = Dwarfdump> {
    locator: DsymLocator<R>,
    tools: Tools,
}

impl SymbolicationService<Dwarfdump> {
    /// Creates a service from the configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_locator(DsymLocator::from_config(config), config.tools.clone())
    }
}

impl<R: UuidReader> SymbolicationService<R> {
    /// Creates a service with a custom dSYM locator.
    pub fn with_locator(locator: DsymLocator<R>, tools: Tools) -> Self {
        SymbolicationService { locator, tools }
    }

    /// Symbolicates a crash report and returns the path of the result.
    pub fn run(&self, request: SymbolicationRequest) -> Result<PathBuf, SymbolicateError> {
        let SymbolicationRequest {
            crash_file,
            dsym,
            output,
        } = request;

        if !crash_file.exists() {
            return Err(SymbolicateError::CrashFileNotFound(crash_file));
        }

        let info = CrashFileInfo::from_path(&crash_file).unwrap_or_else(|error| {
            tracing::warn!("Error reading crash file: {}", error);
            CrashFileInfo::default()
        });

        let dsym = match dsym {
            Some(dsym) if dsym.exists() => dsym,
            Some(dsym) => return Err(SymbolicateError::DsymNotFound(dsym)),
            None => {
                let uuid = info.uuid.as_deref().ok_or(SymbolicateError::MissingUuid)?;
                tracing::info!("Found UUID in crash file: {}", uuid);

                let dsym = self
                    .locator
                    .find(uuid)
                    .ok_or_else(|| SymbolicateError::NoMatchingDsym(uuid.to_owned()))?;
                tracing::info!("Found matching dSYM file: {}", dsym.display());
                dsym
            }
        };

        let output = output.unwrap_or_else(|| default_output_path(&crash_file));

        let mut tool = Symbolicator::for_os_version(info.os_version.as_deref());
        tracing::info!(
            "Symbolicating : {}, new version: {}",
            crash_file.display(),
            tool.is_modern()
        );

        if tool.is_modern() && !self.tools.crash_symbolicator.exists() {
            tracing::warn!(
                "Xcode 15 crash symbolizer not found at {}, falling back to symbolicatecrash",
                self.tools.crash_symbolicator.display()
            );
            tool = Symbolicator::SymbolicateCrash;
        }

        match tool {
            Symbolicator::CrashSymbolicator => {
                self.run_crash_symbolicator(&crash_file, &dsym, &output)?
            }
            Symbolicator::SymbolicateCrash => {
                self.run_symbolicatecrash(&crash_file, &dsym, &output)?
            }
        }

        tracing::info!("Symbolication successful, output file: {}", output.display());
        Ok(output)
    }

    fn run_crash_symbolicator(
        &self,
        crash_file: &Path,
        dsym: &Path,
        output: &Path,
    ) -> Result<(), SymbolicateError> {
        let mut command = Command::new(&self.tools.python);
        command
            .arg(&self.tools.crash_symbolicator)
            .arg(crash_file)
            .arg("-d")
            .arg(dsym)
            .arg("-o")
            .arg(output);

        let ToolOutput { stderr, .. } =
            run_tool(&mut command).map_err(|source| SymbolicateError::Tool {
                tool: Symbolicator::CrashSymbolicator,
                source,
            })?;
        log_warnings(&stderr);

        Ok(())
    }

    fn run_symbolicatecrash(
        &self,
        crash_file: &Path,
        dsym: &Path,
        output: &Path,
    ) -> Result<(), SymbolicateError> {
        let program = self.tools.symbolicatecrash_path();
        if !program.exists() {
            return Err(SymbolicateError::ToolNotFound(program));
        }

        let mut command = Command::new(&program);
        command.arg(crash_file).arg(dsym);
        if let Some(ref developer_dir) = self.tools.developer_dir {
            command.env("DEVELOPER_DIR", developer_dir);
        }

        let ToolOutput { stdout, stderr } =
            run_tool(&mut command).map_err(|source| SymbolicateError::Tool {
                tool: Symbolicator::SymbolicateCrash,
                source,
            })?;
        log_warnings(&stderr);

        fs::write(output, stdout).map_err(|source| SymbolicateError::WriteOutput {
            path: output.to_owned(),
            source,
        })
    }
}

fn log_warnings(stderr: &str) {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        tracing::warn!("Warnings during symbolication: {}", stderr);
    }
}
