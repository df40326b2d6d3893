use serde::{Deserialize, Serialize};

/// Contract an [`crate::InvocationResult`] is checked against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stdout_fields: Vec<FieldExpectation>,
}

/// A line of stdout starting with `label` must contain `contains`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldExpectation {
    pub label: String,
    pub contains: String,
}

impl Expectation {
    /// Exit code zero, no output requirements.
    #[must_use]
    pub fn success() -> Self {
        Self::exit(0)
    }

    #[must_use]
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            stderr_prefix: None,
            stdout_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_stderr_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.stderr_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, label: impl Into<String>, contains: impl Into<String>) -> Self {
        self.stdout_fields.push(FieldExpectation {
            label: label.into(),
            contains: contains.into(),
        });
        self
    }
}

impl Default for Expectation {
    fn default() -> Self {
        Self::success()
    }
}
