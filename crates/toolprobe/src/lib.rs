//! Toolprobe: a conformance harness for command-line image tools.
//!
//! This crate drives external executables (a checker, a preview generator, an
//! info/dump tool) with fixed argument combinations against sample files,
//! captures exit status and textual output, and checks both against a
//! declared contract. The tools themselves are opaque; only their
//! process-level behavior is verified.

#![forbid(unsafe_code)]
// Library documentation is in progress. Public API types have docs;
// internal types will be documented in future releases.
#![allow(missing_docs)]

pub mod assertions;
pub mod config;
pub mod fixtures;
pub mod invoker;
pub mod model;
pub mod report;
pub mod runner;
pub mod scenario;

pub use crate::model::*;

pub mod run {
    use super::invoker::ProcessInvoker;
    use super::runner::{Runner, RunnerOptions, RunnerResult};
    use super::{RunReport, Scenario};
    use crate::config::HarnessConfig;

    /// Run scenarios with a process invoker configured from `config`.
    pub fn run_suite_with_options(
        scenarios: Vec<Scenario>,
        config: &HarnessConfig,
        options: RunnerOptions,
    ) -> RunnerResult<RunReport> {
        let runner = Runner::new(ProcessInvoker::new(config.timeout), options);
        runner.run_suite(scenarios)
    }

    /// Run scenarios with the default configuration and no progress reporting.
    pub fn run_suite(scenarios: Vec<Scenario>) -> RunnerResult<RunReport> {
        run_suite_with_options(
            scenarios,
            &HarnessConfig::default(),
            RunnerOptions::default(),
        )
    }
}
