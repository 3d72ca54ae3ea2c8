// See <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use ipsym_test as tu;

fn ips2crash(home: &Path, args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ips2crash"))
        .args(args)
        .env("HOME", home)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn test_converts_next_to_input() {
    let dir = tu::tempdir();
    let input = dir.path().join("sample.ips");
    fs::copy(tu::fixture("reports/sample.ips"), &input).unwrap();

    let output = ips2crash(dir.path(), &[&input]);
    assert!(output.status.success());

    let expected = dir.path().join("Demo_2024-03-05_14-22-31.crash");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Successfully converted to:"));
    assert!(stdout.contains(&expected.display().to_string()));

    let crash = fs::read_to_string(expected).unwrap();
    assert!(crash.starts_with("Incident Identifier: "));
    assert!(crash.contains("Exception Type:"));
}

#[test]
fn test_explicit_output_name() {
    let dir = tu::tempdir();
    let input = dir.path().join("legacy.ips");
    fs::copy(tu::fixture("reports/legacy.ips"), &input).unwrap();

    let output = ips2crash(dir.path(), &[&input, Path::new("Legacy.crash")]);
    assert!(output.status.success());
    assert!(dir.path().join("Legacy.crash").is_file());
}

#[test]
fn test_missing_input() {
    let dir = tu::tempdir();
    let input = dir.path().join("nope.ips");

    let output = ips2crash(dir.path(), &[&input]);
    assert_eq!(output.status.code(), Some(1));

    // reported once, through the final error
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = format!("File not found: {}", input.display());
    assert_eq!(stderr.matches(&message).count(), 1);
    assert!(output.stdout.is_empty());
}
