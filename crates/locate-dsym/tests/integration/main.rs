// See <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use ipsym_test as tu;

const UUID: &str = "5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B";

/// Writes a config using a fake `dwarfdump` that reads `<dsym>/uuid` and a fake `open` that
/// records its argument in `<dir>/opened`.
fn write_config(dir: &Path) -> PathBuf {
    let dwarfdump = tu::fake_tool(
        dir,
        "dwarfdump",
        r#"[ -f "$2/uuid" ] || exit 1
echo "UUID: $(cat "$2/uuid") (arm64) $2""#,
    );
    let open = tu::fake_tool(dir, "open", &format!(r#"echo "$1" > "{}/opened""#, dir.display()));

    let config = dir.join("config.yml");
    fs::write(
        &config,
        format!(
            "archives:\n  - {}\ntools:\n  dwarfdump: {}\n  open: {}\n",
            dir.join("Archives").display(),
            dwarfdump.display(),
            open.display()
        ),
    )
    .unwrap();
    config
}

fn locate_dsym(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_locate-dsym"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn archive_dsyms(dir: &Path) -> Vec<PathBuf> {
    let dsyms = tu::xcarchive(
        &dir.join("Archives/2024-03-05"),
        "Demo 05.03.24.xcarchive",
        &["Demo.app.dSYM", "Widget.appex.dSYM"],
    );
    fs::write(dsyms[0].join("uuid"), UUID).unwrap();
    fs::write(dsyms[1].join("uuid"), "11111111-2222-3333-4444-555555555555").unwrap();
    dsyms
}

#[test]
fn test_finds_and_opens() {
    let dir = tu::tempdir();
    let config = write_config(dir.path());
    let dsyms = archive_dsyms(dir.path());

    let output = locate_dsym(&config, &[&UUID.to_lowercase()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Found dSYM at: {}", dsyms[0].display())));

    let opened = fs::read_to_string(dir.path().join("opened")).unwrap();
    assert_eq!(opened.trim_end(), dsyms[0].parent().unwrap().display().to_string());
}

#[test]
fn test_no_open() {
    let dir = tu::tempdir();
    let config = write_config(dir.path());
    archive_dsyms(dir.path());

    let output = locate_dsym(&config, &[UUID, "--no-open"]);
    assert!(output.status.success());
    assert!(!dir.path().join("opened").exists());
}

#[test]
fn test_not_found() {
    let dir = tu::tempdir();
    let config = write_config(dir.path());
    archive_dsyms(dir.path());

    let output = locate_dsym(&config, &["00000000-0000-0000-0000-000000000000"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Found dSYM at"));
}

#[test]
fn test_list() {
    let dir = tu::tempdir();
    let config = write_config(dir.path());
    let dsyms = archive_dsyms(dir.path());

    let output = locate_dsym(&config, &["--list"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            format!("{UUID} {}", dsyms[0].display()),
            format!("11111111-2222-3333-4444-555555555555 {}", dsyms[1].display()),
        ]
    );
}

#[test]
fn test_archives_override() {
    let dir = tu::tempdir();
    let config = write_config(dir.path());
    archive_dsyms(dir.path());
    let empty = tu::tempdir();

    let output = locate_dsym(
        &config,
        &[UUID, "--no-open", "--archives", &empty.path().display().to_string()],
    );
    assert_eq!(output.status.code(), Some(1));
}
