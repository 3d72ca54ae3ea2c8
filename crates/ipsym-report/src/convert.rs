use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{CrashHeader, ReportError};

/// An IPS report split into its metadata header and the remaining content.
#[derive(Debug)]
pub struct IpsReport<'a> {
    header: CrashHeader,
    rest: &'a str,
}

impl<'a> IpsReport<'a> {
    /// Splits an IPS report and parses its header line.
    pub fn parse(text: &'a str) -> Result<Self, ReportError> {
        let mut lines = text.split_inclusive('\n');
        let first = lines.next().ok_or(ReportError::Empty)?;
        let header = CrashHeader::from_line(first)?;

        Ok(IpsReport {
            header,
            rest: &text[first.len()..],
        })
    }

    /// The parsed metadata header.
    pub fn header(&self) -> &CrashHeader {
        &self.header
    }

    /// The part of the report carried over into the legacy format.
    ///
    /// This starts at the first blank line after the header, including that line, and runs
    /// to the end of the report. Anything before it is dropped.
    pub fn body(&self) -> &'a str {
        let mut offset = 0;
        for line in self.rest.split_inclusive('\n') {
            if line.trim().is_empty() {
                return &self.rest[offset..];
            }
            offset += line.len();
        }
        ""
    }

    /// Renders the fixed set of legacy header lines, terminated by an empty line.
    pub fn legacy_header(&self) -> String {
        let h = &self.header;
        let mut out = String::new();

        // writing into a `String` cannot fail
        let _ = writeln!(out, "Incident Identifier: {}", h.slice_uuid);
        let _ = writeln!(out, "CrashReporter Key: {}", h.crashreporter_key());
        let _ = writeln!(out, "Hardware Model: {}", h.hardware_model());
        let _ = writeln!(out, "Process: {} [{}]", h.app_name, h.pid());
        let _ = writeln!(out, "Path: {}", h.path());
        let _ = writeln!(out, "Identifier: {}", h.bundle_id);
        let _ = writeln!(out, "Version: {} ({})", h.build_version, h.app_version);
        let _ = writeln!(out, "Code Type: ARM-64");
        let _ = writeln!(out, "Role: {}", h.role());
        let _ = writeln!(out, "Date/Time: {}", h.timestamp);
        let _ = writeln!(out, "OS Version: {}", h.os_version);
        let _ = writeln!(out, "Launch Time: {}", h.launch_time());
        out.push('\n');

        out
    }

    /// Renders the complete report in the legacy `.crash` format.
    pub fn to_crash(&self) -> String {
        let mut out = self.legacy_header();
        out.push_str(self.body());
        out
    }
}

/// Converts the IPS report at `ips_path` into a legacy `.crash` file.
///
/// The result is written next to the input file. Its name is `output` if given, otherwise it is
/// derived from the application name and crash time. An absolute `output` path is used as is.
///
/// Returns the path of the written file.
pub fn convert_ips_file(ips_path: &Path, output: Option<&Path>) -> Result<PathBuf, ReportError> {
    let text = fs::read_to_string(ips_path)?;
    let report = IpsReport::parse(&text)?;

    let file_name = match output {
        Some(output) => output.to_owned(),
        None => PathBuf::from(report.header().default_crash_file_name()?),
    };
    let destination = ips_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(file_name);

    tracing::debug!(
        source = %ips_path.display(),
        destination = %destination.display(),
        "writing legacy crash report"
    );
    fs::write(&destination, report.to_crash())?;

    Ok(destination)
}
