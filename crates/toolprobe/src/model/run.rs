use crate::model::RunId;
use serde::{Deserialize, Serialize};

/// Summary of a run in which every check passed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl RunReport {
    /// Total number of invocations that were run and checked.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps.len()).sum()
    }
}
