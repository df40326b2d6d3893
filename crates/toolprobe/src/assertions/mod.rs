use crate::model::{Expectation, InvocationResult};
use crate::report::Report;
use crate::runner::ErrorCategory;
use thiserror::Error;

/// Longest excerpt of captured text quoted inside a failure message.
const EXCERPT_CHARS: usize = 120;

/// Why an invocation result did not satisfy its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    #[error("expected exit code {expected}, got {actual}")]
    ExitCode { expected: i32, actual: i32 },
    #[error("expected stderr to start with {expected:?}, got {actual:?}")]
    StderrPrefix { expected: String, actual: String },
    #[error("no stdout line starts with {label:?}")]
    FieldMissing { label: String },
    #[error("no stdout line starting with {label:?} contains {expected:?}; found {found:?}")]
    FieldMismatch {
        label: String,
        expected: String,
        found: Vec<String>,
    },
}

impl CheckFailure {
    /// Exit-code mismatches are behavior violations; everything else is content.
    #[must_use]
    pub fn kind(&self) -> ErrorCategory {
        match self {
            Self::ExitCode { .. } => ErrorCategory::Behavior,
            Self::StderrPrefix { .. } | Self::FieldMissing { .. } | Self::FieldMismatch { .. } => {
                ErrorCategory::Content
            }
        }
    }

    #[must_use]
    pub fn check_name(&self) -> &'static str {
        match self {
            Self::ExitCode { .. } => "exit_code",
            Self::StderrPrefix { .. } => "stderr_prefix",
            Self::FieldMissing { .. } | Self::FieldMismatch { .. } => "stdout_field",
        }
    }
}

pub fn check_exit_code(result: &InvocationResult, expected: i32) -> Result<(), CheckFailure> {
    if result.exit_code == expected {
        Ok(())
    } else {
        Err(CheckFailure::ExitCode {
            expected,
            actual: result.exit_code,
        })
    }
}

/// Stderr must begin with `prefix`, byte for byte.
pub fn check_stderr_prefix(result: &InvocationResult, prefix: &str) -> Result<(), CheckFailure> {
    if result.stderr.starts_with(prefix) {
        Ok(())
    } else {
        Err(CheckFailure::StderrPrefix {
            expected: prefix.to_string(),
            actual: excerpt(&result.stderr),
        })
    }
}

/// At least one line starting with `label` must contain `needle`.
pub fn check_field_contains(
    report: &Report,
    label: &str,
    needle: &str,
) -> Result<(), CheckFailure> {
    let candidates: Vec<&str> = report.lines_with_prefix(label).collect();
    if candidates.is_empty() {
        return Err(CheckFailure::FieldMissing {
            label: label.to_string(),
        });
    }
    if candidates.iter().any(|line| line.contains(needle)) {
        Ok(())
    } else {
        Err(CheckFailure::FieldMismatch {
            label: label.to_string(),
            expected: needle.to_string(),
            found: candidates.into_iter().map(excerpt).collect(),
        })
    }
}

/// Check `result` against `expectation`: exit code, then stderr prefix, then stdout fields.
///
/// Stops at the first failing check. Stdout is parsed once and shared by all field checks.
pub fn verify(result: &InvocationResult, expectation: &Expectation) -> Result<(), CheckFailure> {
    check_exit_code(result, expectation.exit_code)?;
    if let Some(prefix) = &expectation.stderr_prefix {
        check_stderr_prefix(result, prefix)?;
    }
    if !expectation.stdout_fields.is_empty() {
        let report = Report::parse(&result.stdout);
        for field in &expectation.stdout_fields {
            check_field_contains(&report, &field.label, &field.contains)?;
        }
    }
    Ok(())
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn result(code: i32, stdout: &str, stderr: &str) -> InvocationResult {
        InvocationResult {
            exit_code: code,
            signal: None,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration_ms: 0,
        }
    }

    #[test]
    fn long_stderr_is_truncated_in_failure() {
        let noisy = "x".repeat(500);
        let err = check_stderr_prefix(&result(1, "", &noisy), "Usage: ").unwrap_err();
        let CheckFailure::StderrPrefix { actual, .. } = &err else {
            panic!("unexpected failure {err:?}");
        };
        assert!(actual.ends_with("..."));
        assert_eq!(actual.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn exit_code_checked_before_output() {
        let expectation = Expectation::exit(1).with_stderr_prefix("Usage: ");
        let err = verify(&result(0, "", "nope"), &expectation).unwrap_err();
        assert_eq!(err.kind(), ErrorCategory::Behavior);
    }
}
