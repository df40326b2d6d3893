pub mod progress;

pub use progress::{NoopProgress, ProgressCallback, ProgressEvent};

use crate::assertions::{verify, CheckFailure};
use crate::invoker::Invoke;
use crate::model::{
    Invocation, InvocationResult, RunId, RunReport, Scenario, ScenarioReport, Step, StepReport,
};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Stable error codes, each mapped to a harness exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Tool exited with a code other than the expected one.
    #[serde(rename = "E_EXIT_CODE")]
    ExitCode,
    /// Exit code matched but required output text was absent.
    #[serde(rename = "E_CONTENT")]
    Content,
    #[serde(rename = "E_CLI_INVALID_ARG")]
    CliInvalidArg,
    /// Suite file could not be loaded or resolved.
    #[serde(rename = "E_SUITE")]
    Suite,
    #[serde(rename = "E_MISSING_PATH")]
    MissingPath,
    #[serde(rename = "E_NOT_EXECUTABLE")]
    NotExecutable,
    #[serde(rename = "E_SPAWN")]
    Spawn,
    #[serde(rename = "E_IO")]
    Io,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
}

/// Broad class of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The harness could not run the tool at all.
    Infrastructure,
    /// The tool ran but its exit status broke the contract.
    Behavior,
    /// The tool ran with the right status but its output broke the contract.
    Content,
    /// The harness itself was misconfigured.
    Usage,
}

impl ErrorCode {
    const ALL: [Self; 9] = [
        Self::ExitCode,
        Self::Content,
        Self::CliInvalidArg,
        Self::Suite,
        Self::MissingPath,
        Self::NotExecutable,
        Self::Spawn,
        Self::Io,
        Self::Timeout,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExitCode => "E_EXIT_CODE",
            Self::Content => "E_CONTENT",
            Self::CliInvalidArg => "E_CLI_INVALID_ARG",
            Self::Suite => "E_SUITE",
            Self::MissingPath => "E_MISSING_PATH",
            Self::NotExecutable => "E_NOT_EXECUTABLE",
            Self::Spawn => "E_SPAWN",
            Self::Io => "E_IO",
            Self::Timeout => "E_TIMEOUT",
        }
    }

    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::ExitCode => ErrorCategory::Behavior,
            Self::Content => ErrorCategory::Content,
            Self::CliInvalidArg | Self::Suite => ErrorCategory::Usage,
            Self::MissingPath | Self::NotExecutable | Self::Spawn | Self::Io | Self::Timeout => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Process exit status the CLI terminates with for this code.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ExitCode | Self::Content => 1,
            Self::CliInvalidArg | Self::Suite => 2,
            Self::MissingPath | Self::NotExecutable | Self::Spawn | Self::Io => 3,
            Self::Timeout => 4,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct RunnerError {
    pub code: ErrorCode,
    pub message: String,
    pub context: Option<Value>,
}

impl RunnerError {
    pub fn new(code: ErrorCode, message: impl Into<String>, context: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            context,
        }
    }

    pub fn missing_path(what: &str, path: &Path) -> Self {
        Self::new(
            ErrorCode::MissingPath,
            format!("{what} does not exist: {}", path.display()),
            Some(serde_json::json!({ "path": path.display().to_string() })),
        )
    }

    pub fn not_executable(path: &Path) -> Self {
        Self::new(
            ErrorCode::NotExecutable,
            format!("tool is not executable: {}", path.display()),
            Some(serde_json::json!({ "path": path.display().to_string() })),
        )
    }

    pub fn spawn(invocation: &Invocation, err: &std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::MissingPath,
            std::io::ErrorKind::PermissionDenied => ErrorCode::NotExecutable,
            _ => ErrorCode::Spawn,
        };
        Self::new(
            code,
            format!("failed to start {}", invocation.program().display()),
            Some(serde_json::json!({
                "invocation": invocation.to_context(),
                "source": err.to_string(),
            })),
        )
    }

    pub fn timeout(invocation: &Invocation, timeout: Duration) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!(
                "{} did not exit within {}ms",
                invocation.program().display(),
                timeout.as_millis()
            ),
            Some(serde_json::json!({
                "invocation": invocation.to_context(),
                "timeout_ms": u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })),
        )
    }

    pub fn io(message: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Io,
            message,
            Some(serde_json::json!({ "source": err.to_string() })),
        )
    }

    pub fn suite(message: impl Into<String>, context: Option<Value>) -> Self {
        Self::new(ErrorCode::Suite, message, context)
    }

    pub fn cli_invalid_arg(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CliInvalidArg, message, None)
    }

    /// A check failed for `step`; keeps everything needed to diagnose it.
    pub fn check_failed(
        scenario: &str,
        step: &Step,
        result: &InvocationResult,
        failure: &CheckFailure,
    ) -> Self {
        let code = match failure.kind() {
            ErrorCategory::Behavior => ErrorCode::ExitCode,
            _ => ErrorCode::Content,
        };
        Self::new(
            code,
            format!("{scenario} / {}: {failure}", step.name),
            Some(serde_json::json!({
                "scenario": scenario,
                "step": step.name,
                "invocation": step.invocation.to_context(),
                "command": step.invocation.to_string(),
                "check": failure.check_name(),
                "exit_code": result.exit_code,
                "stdout": result.stdout,
                "stderr": result.stderr,
            })),
        )
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    fn context_str(&self, key: &str) -> Option<&str> {
        self.context.as_ref()?.get(key)?.as_str()
    }
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl Diagnostic for RunnerError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code.as_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let command = self.context_str("command")?;
        let mut help = format!("command: {command}");
        if let Some(check) = self.context_str("check") {
            let _ = write!(help, "\ncheck: {check}");
        }
        for stream in ["stdout", "stderr"] {
            let text = self.context_str(stream).unwrap_or_default();
            if text.is_empty() {
                let _ = write!(help, "\n{stream}: <empty>");
            } else {
                let _ = write!(help, "\n{stream}:\n{}", text.trim_end());
            }
        }
        Some(Box::new(help))
    }
}

#[derive(Clone, Default)]
pub struct RunnerOptions {
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

/// Executes scenarios one invocation at a time, stopping at the first failure.
pub struct Runner<I> {
    invoker: I,
    options: RunnerOptions,
}

impl<I: Invoke> Runner<I> {
    pub fn new(invoker: I, options: RunnerOptions) -> Self {
        Self { invoker, options }
    }

    /// Run and check every step of `scenario` in order.
    ///
    /// A step only runs once every earlier step has passed.
    pub fn run_scenario(&self, scenario: &Scenario) -> RunnerResult<ScenarioReport> {
        let started = Instant::now();
        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            self.emit(&ProgressEvent::StepStarted {
                step_index: index + 1,
                name: step.name.clone(),
                command: step.invocation.to_string(),
            });
            tracing::debug!(
                scenario = %scenario.name,
                step = %step.name,
                command = %step.invocation,
                "invoking"
            );
            let result = self.invoker.invoke(&step.invocation)?;
            if let Err(failure) = verify(&result, &step.expect) {
                tracing::debug!(exit_code = result.exit_code, %failure, "check failed");
                return Err(RunnerError::check_failed(
                    &scenario.name,
                    step,
                    &result,
                    &failure,
                ));
            }
            self.emit(&ProgressEvent::StepCompleted {
                name: step.name.clone(),
                exit_code: result.exit_code,
                duration_ms: result.duration_ms,
            });
            steps.push(StepReport {
                name: step.name.clone(),
                command: step.invocation.to_string(),
                exit_code: result.exit_code,
                duration_ms: result.duration_ms,
            });
        }
        Ok(ScenarioReport {
            name: scenario.name.clone(),
            duration_ms: elapsed_ms(&started),
            steps,
        })
    }

    /// Run scenarios in order, releasing each one's fixtures before the next starts.
    pub fn run_suite(&self, scenarios: Vec<Scenario>) -> RunnerResult<RunReport> {
        let run_id = RunId::new();
        let started = Instant::now();
        self.emit(&ProgressEvent::RunStarted {
            run_id,
            total_scenarios: scenarios.len(),
        });

        let mut reports = Vec::with_capacity(scenarios.len());
        for (index, scenario) in scenarios.into_iter().enumerate() {
            self.emit(&ProgressEvent::ScenarioStarted {
                scenario_index: index + 1,
                name: scenario.name.clone(),
                total_steps: scenario.steps.len(),
            });
            let outcome = self.run_scenario(&scenario);
            drop(scenario);
            match outcome {
                Ok(report) => {
                    tracing::info!(
                        scenario = %report.name,
                        steps = report.steps.len(),
                        "scenario passed"
                    );
                    self.emit(&ProgressEvent::ScenarioCompleted {
                        name: report.name.clone(),
                        duration_ms: report.duration_ms,
                    });
                    reports.push(report);
                }
                Err(err) => {
                    self.emit(&ProgressEvent::RunCompleted {
                        run_id,
                        success: false,
                        duration_ms: elapsed_ms(&started),
                    });
                    return Err(err);
                }
            }
        }

        let duration_ms = elapsed_ms(&started);
        self.emit(&ProgressEvent::RunCompleted {
            run_id,
            success: true,
            duration_ms,
        });
        Ok(RunReport {
            run_id,
            duration_ms,
            scenarios: reports,
        })
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(progress) = &self.options.progress {
            progress.on_progress(event);
        }
    }
}

pub(crate) fn elapsed_ms(started: &Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::progress::CollectingProgress;
    use super::*;
    use crate::model::Expectation;
    use std::cell::RefCell;

    /// Replays canned results and records what it was asked to run.
    struct ScriptedInvoker {
        results: RefCell<Vec<InvocationResult>>,
        seen: RefCell<Vec<String>>,
    }

    impl ScriptedInvoker {
        fn new(results: Vec<InvocationResult>) -> Self {
            Self {
                results: RefCell::new(results),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Invoke for ScriptedInvoker {
        fn invoke(&self, invocation: &Invocation) -> RunnerResult<InvocationResult> {
            self.seen.borrow_mut().push(invocation.to_string());
            let mut results = self.results.borrow_mut();
            if results.is_empty() {
                return Err(RunnerError::io("no scripted result left", "exhausted"));
            }
            Ok(results.remove(0))
        }
    }

    fn exited(code: i32, stdout: &str, stderr: &str) -> InvocationResult {
        InvocationResult {
            exit_code: code,
            signal: None,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration_ms: 1,
        }
    }

    fn step(name: &str, expect: Expectation) -> Step {
        Step {
            name: name.to_string(),
            invocation: Invocation::new("/opt/tools/check", [name]),
            expect,
        }
    }

    fn scenario(name: &str, steps: Vec<Step>) -> Scenario {
        Scenario::new(name, steps)
    }

    #[test]
    fn error_codes_round_trip_through_parse() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ErrorCode::parse("E_NOPE"), None);
    }

    #[test]
    fn infrastructure_errors_exit_differently_from_check_failures() {
        assert_eq!(ErrorCode::ExitCode.exit_code(), 1);
        assert_eq!(ErrorCode::Content.exit_code(), 1);
        assert_eq!(ErrorCode::MissingPath.exit_code(), 3);
        assert_eq!(ErrorCode::Timeout.exit_code(), 4);
        assert_eq!(
            ErrorCode::NotExecutable.category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn run_suite_reports_every_step_when_all_pass() {
        let invoker = ScriptedInvoker::new(vec![exited(0, "", ""), exited(0, "", "")]);
        let runner = Runner::new(invoker, RunnerOptions::default());
        let scenarios = vec![
            scenario("a", vec![step("one", Expectation::success())]),
            scenario("b", vec![step("two", Expectation::success())]),
        ];

        let report = runner.run_suite(scenarios).expect("suite should pass");
        assert_eq!(report.invocation_count(), 2);
        assert_eq!(report.scenarios.len(), 2);
    }

    #[test]
    fn run_suite_stops_at_first_failure() {
        let invoker = ScriptedInvoker::new(vec![
            exited(1, "", "bad file"),
            exited(0, "", ""),
            exited(0, "", ""),
        ]);
        let runner = Runner::new(invoker, RunnerOptions::default());
        let scenarios = vec![
            scenario(
                "a",
                vec![
                    step("one", Expectation::success()),
                    step("two", Expectation::success()),
                ],
            ),
            scenario("b", vec![step("three", Expectation::success())]),
        ];

        let err = runner.run_suite(scenarios).err();
        let err = err.as_ref().map(|e| (e.code, e.context_str("stderr")));
        assert_eq!(err, Some((ErrorCode::ExitCode, Some("bad file"))));
        assert_eq!(runner.invoker.seen.borrow().len(), 1);
    }

    #[test]
    fn content_failure_keeps_captured_output() {
        let invoker = ScriptedInvoker::new(vec![exited(1, "", "bad args\n")]);
        let runner = Runner::new(invoker, RunnerOptions::default());
        let scenarios = vec![scenario(
            "usage",
            vec![step(
                "no args",
                Expectation::exit(1).with_stderr_prefix("Usage: "),
            )],
        )];

        let err = runner
            .run_suite(scenarios)
            .expect_err("usage check should fail");
        assert_eq!(err.code, ErrorCode::Content);
        assert_eq!(err.context_str("check"), Some("stderr_prefix"));
        assert_eq!(err.context_str("command"), Some("/opt/tools/check no args"));
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("bad args"), "help was: {help}");
    }

    #[test]
    fn invoker_errors_propagate_unchanged() {
        let invoker = ScriptedInvoker::new(Vec::new());
        let runner = Runner::new(invoker, RunnerOptions::default());
        let scenarios = vec![scenario("a", vec![step("one", Expectation::success())])];

        let err = runner.run_suite(scenarios).err().map(|e| e.code);
        assert_eq!(err, Some(ErrorCode::Io));
    }

    #[test]
    fn progress_events_follow_execution_order() {
        let progress = Arc::new(CollectingProgress::default());
        let options = RunnerOptions {
            progress: Some(progress.clone() as Arc<dyn ProgressCallback>),
        };
        let invoker = ScriptedInvoker::new(vec![exited(0, "", "")]);
        let runner = Runner::new(invoker, options);
        let scenarios = vec![scenario("a", vec![step("one", Expectation::success())])];

        assert!(runner.run_suite(scenarios).is_ok());
        let kinds: Vec<&str> = progress
            .events()
            .iter()
            .map(|event| match event {
                ProgressEvent::RunStarted { .. } => "run_started",
                ProgressEvent::ScenarioStarted { .. } => "scenario_started",
                ProgressEvent::StepStarted { .. } => "step_started",
                ProgressEvent::StepCompleted { .. } => "step_completed",
                ProgressEvent::ScenarioCompleted { .. } => "scenario_completed",
                ProgressEvent::RunCompleted { .. } => "run_completed",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "run_started",
                "scenario_started",
                "step_started",
                "step_completed",
                "scenario_completed",
                "run_completed",
            ]
        );
    }
}
