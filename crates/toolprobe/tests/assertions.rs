// Test module - relaxed lint rules
#![allow(clippy::indexing_slicing)]
#![allow(clippy::panic)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

use toolprobe::assertions::{
    check_exit_code, check_field_contains, check_stderr_prefix, verify, CheckFailure,
};
use toolprobe::report::Report;
use toolprobe::runner::ErrorCategory;
use toolprobe::{Expectation, InvocationResult, USAGE_BANNER};

// =============================================================================
// Helper Functions
// =============================================================================

fn result(exit_code: i32, stdout: &str, stderr: &str) -> InvocationResult {
    InvocationResult {
        exit_code,
        signal: None,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        duration_ms: 0,
    }
}

const HEADER_DUMP: &str = concat!(
    "File out.exr:\n",
    "  channels 3\n",
    "  preview 25 x 25\n",
    "  preview 50 x 50\n",
    "  previewSettings default\n",
);

// =============================================================================
// Exit Code
// =============================================================================

#[test]
fn exit_code_passes_when_equal() {
    assert!(check_exit_code(&result(0, "", ""), 0).is_ok());
    assert!(check_exit_code(&result(1, "", ""), 1).is_ok());
}

#[test]
fn exit_code_fails_with_both_values() {
    let err = check_exit_code(&result(1, "", ""), 0).unwrap_err();
    assert_eq!(
        err,
        CheckFailure::ExitCode {
            expected: 0,
            actual: 1
        }
    );
    assert_eq!(err.kind(), ErrorCategory::Behavior);
    assert_eq!(err.check_name(), "exit_code");
    assert_eq!(err.to_string(), "expected exit code 0, got 1");
}

#[test]
fn signalled_exit_code_does_not_pass_as_failure() {
    let mut killed = result(137, "", "");
    killed.signal = Some(9);
    assert!(check_exit_code(&killed, 1).is_err());
}

// =============================================================================
// Stderr Prefix
// =============================================================================

#[test]
fn usage_banner_prefix_passes() {
    let stderr = "Usage: exrmakepreview [options] infile outfile\n";
    assert!(check_stderr_prefix(&result(1, "", stderr), USAGE_BANNER).is_ok());
}

#[test]
fn stderr_prefix_is_case_sensitive() {
    let err = check_stderr_prefix(&result(1, "", "usage: tool\n"), "Usage: ").unwrap_err();
    assert_eq!(err.kind(), ErrorCategory::Content);
    assert_eq!(err.check_name(), "stderr_prefix");
}

#[test]
fn stderr_prefix_must_be_at_the_start() {
    for stderr in [" Usage: tool", "\nUsage: tool", "error\nUsage: tool", "Usage:tool"] {
        assert!(
            check_stderr_prefix(&result(1, "", stderr), "Usage: ").is_err(),
            "{stderr:?} should not match"
        );
    }
}

#[test]
fn empty_stderr_reports_empty_actual() {
    let err = check_stderr_prefix(&result(1, "", ""), "Usage: ").unwrap_err();
    assert_eq!(
        err,
        CheckFailure::StderrPrefix {
            expected: "Usage: ".to_string(),
            actual: String::new(),
        }
    );
}

// =============================================================================
// Labeled Fields
// =============================================================================

#[test]
fn any_labeled_line_may_hold_the_needle() {
    let report = Report::parse(HEADER_DUMP);
    assert!(check_field_contains(&report, "  preview", "preview 50 x 50").is_ok());
}

#[test]
fn field_mismatch_lists_every_labeled_line() {
    let report = Report::parse(HEADER_DUMP);
    let err = check_field_contains(&report, "  preview", "preview 64 x 64").unwrap_err();
    let CheckFailure::FieldMismatch { label, found, .. } = &err else {
        panic!("unexpected failure {err:?}");
    };
    assert_eq!(label, "  preview");
    assert_eq!(
        found,
        &[
            "  preview 25 x 25",
            "  preview 50 x 50",
            "  previewSettings default"
        ]
    );
    assert_eq!(err.kind(), ErrorCategory::Content);
    assert_eq!(err.check_name(), "stdout_field");
}

#[test]
fn label_leading_whitespace_is_significant() {
    let report = Report::parse("preview 50 x 50\n");
    let err = check_field_contains(&report, "  preview", "50 x 50").unwrap_err();
    assert_eq!(
        err,
        CheckFailure::FieldMissing {
            label: "  preview".to_string()
        }
    );
}

#[test]
fn missing_label_differs_from_mismatch() {
    let report = Report::parse(HEADER_DUMP);
    assert!(matches!(
        check_field_contains(&report, "  dataWindow", "0 0").unwrap_err(),
        CheckFailure::FieldMissing { .. }
    ));
    assert!(matches!(
        check_field_contains(&report, "  channels", "4").unwrap_err(),
        CheckFailure::FieldMismatch { .. }
    ));
}

#[test]
fn empty_stdout_has_no_fields() {
    let report = Report::parse("");
    assert!(matches!(
        check_field_contains(&report, "  preview", "50 x 50").unwrap_err(),
        CheckFailure::FieldMissing { .. }
    ));
}

// =============================================================================
// Full Expectation
// =============================================================================

#[test]
fn success_expectation_ignores_output() {
    let noisy = result(0, "anything\n", "warning: something\n");
    assert!(verify(&noisy, &Expectation::success()).is_ok());
}

#[test]
fn usage_expectation_passes_on_banner() {
    let expectation = Expectation::exit(1).with_stderr_prefix(USAGE_BANNER);
    assert!(verify(&result(1, "", "Usage: tool -h\n"), &expectation).is_ok());
}

#[test]
fn stderr_checked_after_matching_exit_code() {
    let expectation = Expectation::exit(1).with_stderr_prefix(USAGE_BANNER);
    let err = verify(&result(1, "", "bad option\n"), &expectation).unwrap_err();
    assert_eq!(err.check_name(), "stderr_prefix");
}

#[test]
fn every_field_must_hold() {
    let expectation = Expectation::success()
        .with_field("  preview", "preview 50 x 50")
        .with_field("  channels", "3");
    assert!(verify(&result(0, HEADER_DUMP, ""), &expectation).is_ok());

    let expectation = expectation.with_field("  compression", "zip");
    let err = verify(&result(0, HEADER_DUMP, ""), &expectation).unwrap_err();
    assert_eq!(
        err,
        CheckFailure::FieldMissing {
            label: "  compression".to_string()
        }
    );
}

#[test]
fn first_failing_field_is_reported() {
    let expectation = Expectation::success()
        .with_field("  channels", "4")
        .with_field("  compression", "zip");
    let err = verify(&result(0, HEADER_DUMP, ""), &expectation).unwrap_err();
    assert!(matches!(err, CheckFailure::FieldMismatch { ref label, .. } if label == "  channels"));
}

#[test]
fn crlf_output_still_matches_fields() {
    let stdout = HEADER_DUMP.replace('\n', "\r\n");
    let expectation = Expectation::success().with_field("  preview", "preview 50 x 50");
    assert!(verify(&result(0, &stdout, ""), &expectation).is_ok());
}
