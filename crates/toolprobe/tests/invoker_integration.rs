// Test module - relaxed lint rules
#![allow(clippy::indexing_slicing)]
#![allow(clippy::panic)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]
#![cfg(unix)]

//! Process invoker integration tests
//!
//! Drives `/bin/sh` stub tools to check exit-code capture, stream separation
//! and infrastructure failures.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolprobe::invoker::{Invoke, ProcessInvoker};
use toolprobe::runner::ErrorCode;
use toolprobe::Invocation;

// =============================================================================
// Helper Functions
// =============================================================================

fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn invoker() -> ProcessInvoker {
    ProcessInvoker::new(Some(Duration::from_secs(30)))
}

// =============================================================================
// Capture
// =============================================================================

#[test]
fn nonzero_exit_is_a_result_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "fail", "echo 'Usage: fail [-h]' >&2\nexit 1");

    let result = invoker().invoke(&Invocation::new(&tool, ["-h"])).unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(!result.success());
    assert_eq!(result.stderr, "Usage: fail [-h]\n");
    assert!(result.stdout.is_empty());
}

#[test]
fn stdout_and_stderr_are_captured_separately() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "both", "echo out\necho err >&2");

    let result = invoker().invoke(&Invocation::new(&tool, Vec::<String>::new())).unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
}

#[test]
fn arguments_are_passed_verbatim_and_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "args", "for a in \"$@\"; do echo \"[$a]\"; done");

    let result = invoker()
        .invoke(&Invocation::new(&tool, ["-w", "50", "with space"]))
        .unwrap();

    assert_eq!(result.stdout, "[-w]\n[50]\n[with space]\n");
}

#[test]
fn large_output_does_not_deadlock() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(
        dir.path(),
        "chatty",
        "i=0\nwhile [ $i -lt 20000 ]; do echo \"line $i\"; echo \"err $i\" >&2; i=$((i+1)); done",
    );

    let result = invoker().invoke(&Invocation::new(&tool, Vec::<String>::new())).unwrap();

    assert_eq!(result.stdout.lines().count(), 20000);
    assert_eq!(result.stderr.lines().count(), 20000);
}

#[test]
fn invalid_utf8_output_is_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "bytes", "printf 'ok \\377\\n'");

    let result = invoker().invoke(&Invocation::new(&tool, Vec::<String>::new())).unwrap();

    assert!(result.stdout.starts_with("ok "));
    assert!(result.stdout.contains('\u{FFFD}'));
}

#[test]
fn signal_death_maps_to_128_plus_signal() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "killed", "kill -9 $$");

    let result = invoker().invoke(&Invocation::new(&tool, Vec::<String>::new())).unwrap();

    assert_eq!(result.signal, Some(9));
    assert_eq!(result.exit_code, 137);
}

// =============================================================================
// Infrastructure Failures
// =============================================================================

#[test]
fn missing_tool_is_a_missing_path() {
    let err = invoker()
        .invoke(&Invocation::new("/definitely/not/a/tool", ["-c"]))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingPath);
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn non_executable_tool_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "plain", "exit 0");
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();

    let err = invoker().invoke(&Invocation::new(&tool, Vec::<String>::new())).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotExecutable);
}

#[test]
fn hung_tool_is_killed_at_the_bound() {
    let dir = tempfile::tempdir().unwrap();
    let tool = stub(dir.path(), "hang", "exec sleep 30");

    let started = std::time::Instant::now();
    let err = ProcessInvoker::new(Some(Duration::from_millis(200)))
        .invoke(&Invocation::new(&tool, Vec::<String>::new()))
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Timeout);
    assert_eq!(err.exit_code(), 4);
    assert!(started.elapsed() < Duration::from_secs(10));
}
