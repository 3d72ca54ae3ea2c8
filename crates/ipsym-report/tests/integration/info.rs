use ipsym_report::CrashFileInfo;
use ipsym_test as tu;

#[test]
fn test_info_from_fixture() {
    let info = CrashFileInfo::from_path(&tu::fixture("reports/sample.ips")).unwrap();
    assert_eq!(
        info.uuid.as_deref(),
        Some("5a3c1f9e-8b2d-3e4f-9a1b-2c3d4e5f6a7b")
    );
    assert_eq!(info.os_version.as_deref(), Some("iPhone OS 17.2.1 (21C66)"));
    assert_eq!(info.os_major_version(), Some(17));
}

#[test]
fn test_info_legacy_os() {
    let info = CrashFileInfo::from_path(&tu::fixture("reports/legacy.ips")).unwrap();
    assert_eq!(info.os_major_version(), Some(14));
}
