//! Progress callback for reporting run progress.
//!
//! This module provides a trait for receiving progress events during a run.

use crate::model::RunId;

/// Event emitted while scenarios execute.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run has started.
    RunStarted {
        /// Unique run identifier.
        run_id: RunId,
        /// Number of scenarios queued.
        total_scenarios: usize,
    },
    /// A scenario has started.
    ScenarioStarted {
        /// Current scenario index (1-based).
        scenario_index: usize,
        /// Scenario name.
        name: String,
        /// Number of invocations in the scenario.
        total_steps: usize,
    },
    /// An invocation is about to be spawned.
    StepStarted {
        /// Current step index within the scenario (1-based).
        step_index: usize,
        /// Step name.
        name: String,
        /// Rendered command line.
        command: String,
    },
    /// An invocation finished and all of its checks passed.
    StepCompleted {
        /// Step name.
        name: String,
        /// Exit code observed.
        exit_code: i32,
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Every step of a scenario passed.
    ScenarioCompleted {
        /// Scenario name.
        name: String,
        /// Duration in milliseconds.
        duration_ms: u64,
    },
    /// Run has completed.
    RunCompleted {
        /// Unique run identifier.
        run_id: RunId,
        /// Whether every scenario passed.
        success: bool,
        /// Total duration in milliseconds.
        duration_ms: u64,
    },
}

/// Trait for receiving progress events during execution.
///
/// Implementors can use this to display progress or log events.
pub trait ProgressCallback: Send + Sync {
    /// Called for each progress event.
    fn on_progress(&self, event: &ProgressEvent);
}

/// A no-op progress callback that discards all events.
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// A progress callback that collects events for testing.
#[cfg(test)]
pub struct CollectingProgress {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

#[cfg(test)]
impl Default for CollectingProgress {
    fn default() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl CollectingProgress {
    /// Get collected events.
    ///
    /// # Panics
    /// Panics if the mutex is poisoned (indicates a prior panic during event collection).
    #[allow(clippy::expect_used)]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .expect("progress mutex poisoned - prior panic during event collection")
            .clone()
    }
}

#[cfg(test)]
impl ProgressCallback for CollectingProgress {
    #[allow(clippy::expect_used)]
    fn on_progress(&self, event: &ProgressEvent) {
        self.events
            .lock()
            .expect("progress mutex poisoned")
            .push(event.clone());
    }
}
