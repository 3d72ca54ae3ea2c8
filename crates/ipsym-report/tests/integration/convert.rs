use std::fs;

use ipsym_report::{ReportError, convert_ips_file};
use ipsym_test as tu;

#[test]
fn test_convert_default_name() {
    tu::setup();

    let dir = tu::tempdir();
    let ips = dir.path().join("sample.ips");
    fs::copy(tu::fixture("reports/sample.ips"), &ips).unwrap();

    let written = convert_ips_file(&ips, None).unwrap();
    assert_eq!(written, dir.path().join("Demo_2024-03-05_14-22-31.crash"));

    let crash = fs::read_to_string(&written).unwrap();
    insta::assert_snapshot!(crash, @r###"
    Incident Identifier: 5a3c1f9e-8b2d-3e4f-9a1b-2c3d4e5f6a7b
    CrashReporter Key: unknown
    Hardware Model: unknown
    Process: Demo [0]
    Path: unknown
    Identifier: com.example.demo
    Version: 42 (1.2.0)
    Code Type: ARM-64
    Role: Foreground
    Date/Time: 2024-03-05 14:22:31.00 +0800
    OS Version: iPhone OS 17.2.1 (21C66)
    Launch Time: unknown


    Exception Type:  EXC_CRASH (SIGABRT)
    Exception Codes: 0x0000000000000000, 0x0000000000000000
    Triggered by Thread:  0

    Thread 0 Crashed:
    0   libsystem_kernel.dylib        	0x00000001e1b4a42c __pthread_kill + 8
    1   Demo                          	0x0000000100f3c5a8 0x100f34000 + 34216
    "###);
}

#[test]
fn test_convert_all_fields() {
    tu::setup();

    let dir = tu::tempdir();
    let ips = dir.path().join("legacy.ips");
    fs::copy(tu::fixture("reports/legacy.ips"), &ips).unwrap();

    let written = convert_ips_file(&ips, None).unwrap();
    assert_eq!(written, dir.path().join("Legacy_2021-11-20_08-01-02.crash"));

    let crash = fs::read_to_string(&written).unwrap();
    let header: Vec<_> = crash.lines().take(12).collect();
    assert_eq!(
        header,
        [
            "Incident Identifier: 0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0",
            "CrashReporter Key: b1c2d3e4f5",
            "Hardware Model: iPhone12,1",
            "Process: Legacy [77]",
            "Path: /private/var/containers/Bundle/Application/Legacy.app/Legacy",
            "Identifier: com.example.legacy",
            "Version: 300 (3.0)",
            "Code Type: ARM-64",
            "Role: Background",
            "Date/Time: 2021-11-20 08:01:02.53 -0500",
            "OS Version: iPhone OS 14.8 (18H17)",
            "Launch Time: 2021-11-20 07:59:40.00 -0500",
        ]
    );
    assert!(crash.ends_with("\n\n\nException Type:  EXC_BAD_ACCESS (SIGSEGV)\n"));
}

#[test]
fn test_convert_relative_output_lands_next_to_input() {
    let dir = tu::tempdir();
    let ips = dir.path().join("sample.ips");
    fs::copy(tu::fixture("reports/sample.ips"), &ips).unwrap();

    let written = convert_ips_file(&ips, Some("renamed.crash".as_ref())).unwrap();
    assert_eq!(written, dir.path().join("renamed.crash"));
    assert!(written.is_file());
}

#[test]
fn test_convert_absolute_output() {
    let input_dir = tu::tempdir();
    let output_dir = tu::tempdir();
    let ips = input_dir.path().join("sample.ips");
    fs::copy(tu::fixture("reports/sample.ips"), &ips).unwrap();

    let output = output_dir.path().join("out.crash");
    let written = convert_ips_file(&ips, Some(&output)).unwrap();
    assert_eq!(written, output);
    assert!(output.is_file());
}

#[test]
fn test_convert_missing_fields() {
    let err = convert_ips_file(&tu::fixture("reports/missing-fields.ips"), None).unwrap_err();
    assert!(matches!(err, ReportError::MissingField("bundleID")));
}

#[test]
fn test_convert_missing_file() {
    let dir = tu::tempdir();
    let err = convert_ips_file(&dir.path().join("nope.ips"), None).unwrap_err();
    assert!(matches!(err, ReportError::Io(_)));
}
