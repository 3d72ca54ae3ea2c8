//! Helpers for testing the crash report tools.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output
//!    is captured by the test runner.
//!
//!  - When using [`tempdir`], make sure that the handle to the temp directory is held for the
//!    entire lifetime of the test. Assign it to a variable in the test function
//!    (e.g. `let dir = ipsym_test::tempdir()`), otherwise the directory is removed right away.
//!
//!  - External tools like `dwarfdump` do not exist on most test machines. Use [`fake_tool`] to
//!    put a shell script with the expected behavior in their place.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::fmt;

pub use tempfile::TempDir;

/// Setup the test environment.
///
///  - Initializes logs: The logger only captures logs from the `ipsym` crates and mutes all
///    other logs.
pub fn setup() {
    fmt()
        .with_env_filter(EnvFilter::new(
            "ipsym_report=trace,ipsym_service=trace,ips2crash=trace,locate_dsym=trace,symbolicate=trace",
        ))
        .with_target(false)
        .pretty()
        .with_test_writer()
        .try_init()
        .ok();
}

/// Creates a temporary directory.
///
/// The directory is deleted when the [`TempDir`] instance is dropped, unless
/// [`into_path`](TempDir::into_path) is called. Use it as a guard to automatically clean up after
/// tests.
pub fn tempdir() -> TempDir {
    TempDir::new().unwrap()
}

/// Returns the absolute path to the given fixture.
///
/// Fixtures are located in the `tests/fixtures` directory, located from the workspace root.
/// Fixtures can be either files, or directories.
///
/// # Panics
///
/// Panics if the fixture path does not exist on the file system.
pub fn fixture(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let mut full_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    full_path.pop(); // to /crates/
    full_path.pop(); // to /
    full_path.push("./tests/fixtures/");
    full_path.push(path);

    assert!(full_path.exists(), "'{}' does not exist", path.display());

    full_path
}

/// Returns the contents of a fixture.
///
/// # Panics
///
/// Panics if the fixture does not exist or cannot be read.
pub fn read_fixture(path: impl AsRef<Path>) -> Vec<u8> {
    fs::read(fixture(path)).unwrap()
}

/// Writes an executable shell script named `name` into `dir` and returns its path.
///
/// `body` is the script without the shebang line. Arguments are available as `$1`, `$2` and so
/// on, exactly as for the real tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Creates an Xcode archive layout with empty dSYM bundles below `root`.
///
/// `archive` is the path of the `.xcarchive` relative to `root`, and each of `dsyms` is a bundle
/// name created inside its `dSYMs` folder. Returns the paths of the created bundles.
pub fn xcarchive(root: &Path, archive: &str, dsyms: &[&str]) -> Vec<PathBuf> {
    let dsyms_dir = root.join(archive).join("dSYMs");
    fs::create_dir_all(&dsyms_dir).unwrap();

    dsyms
        .iter()
        .map(|name| {
            let bundle = dsyms_dir.join(name);
            fs::create_dir_all(bundle.join("Contents/Resources/DWARF")).unwrap();
            bundle
        })
        .collect()
}
