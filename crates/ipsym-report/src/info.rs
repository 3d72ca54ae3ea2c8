use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::ReportError;
use crate::header::optional;

/// Matches iOS version strings such as `iPhone OS 13.0 (17A577)` or `iOS 15.0 (19A346)`.
static IOS_VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:iPhone OS|iOS)\s+(\d+)").unwrap());

/// The information needed to find debug symbols for a crash report.
///
/// Unlike [`CrashHeader`](crate::CrashHeader), every field is optional here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrashFileInfo {
    /// The UUID of the crashed binary slice.
    pub uuid: Option<String>,
    /// The full OS version string.
    pub os_version: Option<String>,
}

impl CrashFileInfo {
    /// Reads the header line of the crash file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Self::from_line(&line)
    }

    /// Parses the header line of a crash file.
    ///
    /// Scalar values are accepted in place of strings, like in [`CrashHeader`](crate::CrashHeader).
    pub fn from_line(line: &str) -> Result<Self, ReportError> {
        let mut fields: Map<String, Value> =
            serde_json::from_str(line.trim()).map_err(ReportError::InvalidHeader)?;

        Ok(CrashFileInfo {
            uuid: optional(&mut fields, "slice_uuid")?,
            os_version: optional(&mut fields, "os_version")?,
        })
    }

    /// The major iOS version, if it can be determined.
    pub fn os_major_version(&self) -> Option<u32> {
        self.os_version.as_deref().and_then(os_major_version)
    }
}

/// Extracts the major version from an iOS version string.
///
/// Returns `None` for other operating systems.
pub fn os_major_version(os_version: &str) -> Option<u32> {
    IOS_VERSION_REGEX
        .captures(os_version)
        .and_then(|captures| captures.get(1))
        .and_then(|major| major.as_str().parse().ok())
}
