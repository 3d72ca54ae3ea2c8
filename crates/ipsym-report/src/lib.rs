//! Reading Apple IPS crash reports.
//!
//! An IPS report starts with a single line of JSON metadata, the [`CrashHeader`], followed by the
//! report body. This crate parses that header, extracts the bits needed to find debug symbols for
//! a report, and renders the report in the legacy `.crash` text format understood by Apple's
//! symbolication tools.

#![warn(
    missing_docs,
    missing_debug_implementations,
    unused_crate_dependencies,
    clippy::all
)]

mod convert;
mod error;
mod header;
mod info;

pub use convert::{IpsReport, convert_ips_file};
pub use error::ReportError;
pub use header::CrashHeader;
pub use info::{CrashFileInfo, os_major_version};
