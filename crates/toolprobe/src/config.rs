//! Harness configuration from the environment.
//!
//! The CLI takes positional arguments only, so tunables live in environment
//! variables.

use crate::runner::{RunnerError, RunnerResult};
use std::time::Duration;

/// Upper bound on one invocation, in milliseconds. `0` disables the bound.
pub const TIMEOUT_ENV: &str = "TOOLPROBE_TIMEOUT_MS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// `None` waits for a tool indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> RunnerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RunnerResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                RunnerError::cli_invalid_arg(format!(
                    "{TIMEOUT_ENV} must be a whole number of milliseconds, got {raw:?}"
                ))
            })?;
            config.timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::runner::ErrorCode;

    #[test]
    fn default_timeout_applies_when_unset() {
        let config = HarnessConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn zero_disables_the_bound() {
        let config = HarnessConfig::from_lookup(|_| Some("0".to_string())).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn explicit_timeout_is_parsed() {
        let config = HarnessConfig::from_lookup(|_| Some(" 1500 ".to_string())).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn garbage_timeout_is_rejected() {
        let err = HarnessConfig::from_lookup(|_| Some("soon".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::CliInvalidArg);
    }
}
