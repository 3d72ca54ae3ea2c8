//! Finding the dSYM bundle that belongs to a crash report.
//!
//! Xcode keeps the debug symbols of every archived build in `<name>.xcarchive/dSYMs`. The
//! [`DsymLocator`] walks a list of directories containing such archives and asks a
//! [`UuidReader`] for the UUIDs of each dSYM bundle until one matches the crashed binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::tools::{ToolError, run_tool};

/// Matches the UUID lines printed by `dwarfdump --uuid`.
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)UUID: ([0-9A-F-]+)").unwrap());

/// Extracts all UUIDs from the output of `dwarfdump --uuid`.
///
/// Fat bundles contain one UUID per architecture, each printed on its own line:
///
/// ```text
/// UUID: 5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B (arm64) App.dSYM/Contents/Resources/DWARF/App
/// ```
pub fn parse_uuids(output: &str) -> Vec<String> {
    UUID_REGEX
        .captures_iter(output)
        .filter_map(|captures| captures.get(1))
        .map(|uuid| uuid.as_str().to_owned())
        .collect()
}

/// Expands a leading `~` in `path` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_owned(),
        },
        Err(_) => path.to_owned(),
    }
}

/// Reads the UUIDs of a dSYM bundle.
pub trait UuidReader {
    /// Returns all UUIDs contained in the bundle at `dsym`.
    fn read_uuids(&self, dsym: &Path) -> Result<Vec<String>, ToolError>;
}

/// Reads dSYM UUIDs by running `dwarfdump --uuid`.
#[derive(Clone, Debug)]
pub struct Dwarfdump {
    program: PathBuf,
}

impl Dwarfdump {
    /// Creates a reader running the given `dwarfdump` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Dwarfdump {
            program: program.into(),
        }
    }
}

impl Default for Dwarfdump {
    fn default() -> Self {
        Self::new("dwarfdump")
    }
}

impl UuidReader for Dwarfdump {
    fn read_uuids(&self, dsym: &Path) -> Result<Vec<String>, ToolError> {
        let output = run_tool(Command::new(&self.program).arg("--uuid").arg(dsym))?;
        Ok(parse_uuids(&output.stdout))
    }
}

/// A dSYM bundle together with one of its UUIDs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsymCandidate {
    /// Path to the `.dSYM` bundle.
    pub path: PathBuf,
    /// A UUID reported for the bundle.
    pub uuid: String,
}

impl DsymCandidate {
    /// Checks whether this candidate has the given UUID, ignoring case.
    pub fn matches(&self, uuid: &str) -> bool {
        self.uuid.eq_ignore_ascii_case(uuid)
    }
}

/// Searches Xcode archives for dSYM bundles.
#[derive(Clone, Debug)]
pub struct DsymLocator<R = Dwarfdump> {
    archives: Vec<PathBuf>,
    reader: R,
}

impl DsymLocator<Dwarfdump> {
    /// Creates a locator using the configured archive directories and `dwarfdump`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.archives.clone(),
            Dwarfdump::new(&config.tools.dwarfdump),
        )
    }
}

impl<R: UuidReader> DsymLocator<R> {
    /// Creates a locator searching `archives` in order.
    pub fn new(archives: Vec<PathBuf>, reader: R) -> Self {
        DsymLocator { archives, reader }
    }

    /// The directories searched for archives.
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Lists every dSYM UUID found in the archive directories.
    ///
    /// Bundles are read lazily, in the order they are found. Bundles the reader fails on are
    /// logged and skipped.
    pub fn candidates(&self) -> impl Iterator<Item = DsymCandidate> + '_ {
        self.bundles().flat_map(move |bundle| {
            let uuids = match self.reader.read_uuids(&bundle) {
                Ok(uuids) => uuids,
                Err(error) => {
                    tracing::warn!("Error processing dSYM {}: {}", bundle.display(), error);
                    Vec::new()
                }
            };

            uuids.into_iter().map(move |uuid| DsymCandidate {
                path: bundle.clone(),
                uuid,
            })
        })
    }

    /// Returns the first dSYM bundle containing `crash_uuid`.
    pub fn find(&self, crash_uuid: &str) -> Option<PathBuf> {
        match self.candidates().find(|candidate| candidate.matches(crash_uuid)) {
            Some(candidate) => {
                tracing::info!("Found matching dSYM: {}", candidate.path.display());
                Some(candidate.path)
            }
            None => {
                tracing::warn!("No dSYM found for UUID: {}", crash_uuid);
                None
            }
        }
    }

    fn bundles(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.archives
            .iter()
            .map(|root| expand_path(root))
            .filter(|root| {
                let exists = root.exists();
                if !exists {
                    tracing::warn!("Archives directory not found: {}", root.display());
                }
                exists
            })
            .flat_map(|root| find_bundles(root, "xcarchive"))
            .filter_map(|archive| {
                let dsyms = archive.join("dSYMs");
                dsyms.is_dir().then_some(dsyms)
            })
            .flat_map(|dsyms| find_bundles(dsyms, "dSYM"))
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// Recursively finds entries below `root` with the given extension.
///
/// Matching entries are not descended into.
fn find_bundles(root: PathBuf, extension: &'static str) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            entry.depth() <= 1
                || !entry
                    .path()
                    .parent()
                    .is_some_and(|parent| has_extension(parent, extension))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!("Error during search: {}", error);
                None
            }
        })
        .filter(move |entry| has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
}
