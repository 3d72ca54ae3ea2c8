use ipsym_service::dsym::{DsymLocator, Dwarfdump, UuidReader};
use ipsym_service::tools::ToolError;
use ipsym_test as tu;

use crate::{fake_dwarfdump, set_uuids, xcarchive};

#[test]
fn test_reads_all_slices() {
    tu::setup();
    let dir = tu::tempdir();
    let dwarfdump = Dwarfdump::new(fake_dwarfdump(dir.path()));

    let dsyms = xcarchive(dir.path(), "Demo.xcarchive", &["Demo.app.dSYM"]);
    set_uuids(
        &dsyms[0],
        &[
            ("11111111-2222-3333-4444-555555555555", "armv7"),
            ("5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B", "arm64"),
        ],
    );

    let uuids = dwarfdump.read_uuids(&dsyms[0]).unwrap();
    assert_eq!(
        uuids,
        [
            "11111111-2222-3333-4444-555555555555",
            "5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B"
        ]
    );
}

#[test]
fn test_tool_failure() {
    let dir = tu::tempdir();
    let dwarfdump = Dwarfdump::new(fake_dwarfdump(dir.path()));

    let dsyms = xcarchive(dir.path(), "Demo.xcarchive", &["Broken.dSYM"]);
    let err = dwarfdump.read_uuids(&dsyms[0]).unwrap_err();
    assert!(matches!(err, ToolError::Failed { .. }));
    assert!(err.to_string().contains("No such file"));
}

#[test]
fn test_locate_across_roots() {
    tu::setup();
    let tools = tu::tempdir();
    let xcode = tu::tempdir();
    let shared = tu::tempdir();

    let old = xcarchive(xcode.path(), "2024-01-02/Demo 1.0.xcarchive", &["Demo.app.dSYM"]);
    set_uuids(&old[0], &[("AAAAAAAA-0000-0000-0000-000000000000", "arm64")]);

    // fails to read, which must not stop the search
    xcarchive(shared.path(), "CI/Demo 1.1.xcarchive", &["Broken.dSYM"]);
    let new = xcarchive(shared.path(), "CI/Demo 1.2.xcarchive", &["Demo.app.dSYM"]);
    set_uuids(&new[0], &[("5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B", "arm64")]);

    let locator = DsymLocator::new(
        vec![
            xcode.path().join("does-not-exist"),
            xcode.path().to_owned(),
            shared.path().to_owned(),
        ],
        Dwarfdump::new(fake_dwarfdump(tools.path())),
    );

    assert_eq!(
        locator.find("5a3c1f9e-8b2d-3e4f-9a1b-2c3d4e5f6a7b"),
        Some(new[0].clone())
    );
    assert_eq!(locator.find("BBBBBBBB-0000-0000-0000-000000000000"), None);

    let candidates: Vec<_> = locator.candidates().map(|c| c.uuid).collect();
    assert_eq!(
        candidates,
        [
            "AAAAAAAA-0000-0000-0000-000000000000",
            "5A3C1F9E-8B2D-3E4F-9A1B-2C3D4E5F6A7B"
        ]
    );
}
