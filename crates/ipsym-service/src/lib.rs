//! Locating dSYMs and driving Apple's symbolication tools.
//!
//! The actual symbol resolution is done by external programs: `dwarfdump` to read the UUIDs of
//! debug symbol bundles, and either `CrashSymbolicator.py` (Xcode 15 and later) or the legacy
//! `symbolicatecrash` script to symbolicate a crash report. This crate finds the inputs for those
//! tools, runs them, and reports what happened.

#![warn(
    missing_docs,
    missing_debug_implementations,
    unused_crate_dependencies,
    clippy::all
)]

pub mod config;
pub mod dsym;
pub mod logging;
pub mod symbolicate;
pub mod tools;
