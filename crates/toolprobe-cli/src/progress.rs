//! Live progress output on stderr using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use toolprobe::runner::{ProgressCallback, ProgressEvent};

#[derive(Default)]
struct State {
    total_scenarios: usize,
    total_steps: usize,
    /// Spinner and step name of the invocation in flight.
    current: Option<(ProgressBar, String)>,
}

/// Echoes each invocation with a spinner while it runs and a mark once checked.
pub struct VerboseProgress {
    state: Mutex<State>,
    color: bool,
}

impl VerboseProgress {
    pub fn new(color: bool) -> Self {
        Self {
            state: Mutex::new(State::default()),
            color,
        }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl ProgressCallback for VerboseProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let mut stderr = std::io::stderr();
        match event {
            ProgressEvent::RunStarted {
                run_id,
                total_scenarios,
            } => {
                state.total_scenarios = *total_scenarios;
                let _ = writeln!(stderr, "run {run_id}: {total_scenarios} scenarios");
            }
            ProgressEvent::ScenarioStarted {
                scenario_index,
                name,
                total_steps,
            } => {
                state.total_steps = *total_steps;
                let total = state.total_scenarios;
                let _ = writeln!(stderr, "[{scenario_index}/{total}] {name}");
            }
            ProgressEvent::StepStarted {
                step_index,
                name,
                command,
            } => {
                let total = state.total_steps;
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message(format!("({step_index}/{total}) {command}"));
                pb.enable_steady_tick(Duration::from_millis(100));
                state.current = Some((pb, name.clone()));
            }
            ProgressEvent::StepCompleted {
                name,
                exit_code,
                duration_ms,
            } => {
                if let Some((pb, _)) = state.current.take() {
                    pb.finish_and_clear();
                }
                let mark = self.paint("✓", "32");
                let _ = writeln!(
                    stderr,
                    "  {mark} {name} (exit {exit_code}, {duration_ms}ms)"
                );
            }
            ProgressEvent::ScenarioCompleted { .. } => {}
            ProgressEvent::RunCompleted {
                run_id: _,
                success,
                duration_ms,
            } => {
                // A failed run leaves the failing step's spinner behind.
                if let Some((pb, name)) = state.current.take() {
                    pb.finish_and_clear();
                    let mark = self.paint("✗", "31");
                    let _ = writeln!(stderr, "  {mark} {name}");
                }
                let status = if *success {
                    self.paint("passed", "32")
                } else {
                    self.paint("failed", "31")
                };
                let _ = writeln!(stderr, "run {status}: {duration_ms}ms total");
            }
        }
    }
}
