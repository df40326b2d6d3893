pub mod file;
pub mod suites;

pub use file::{load_suite_file, SuiteFile};
pub use suites::{preview_suite, roundtrip_suite, validation_suite, PreviewCase};

use crate::fixtures::TempOutput;
use crate::model::{Expectation, Invocation};

/// One invocation and the contract its result must meet.
#[derive(Clone, Debug)]
pub struct Step {
    pub name: String,
    pub invocation: Invocation,
    pub expect: Expectation,
}

impl Step {
    pub fn new(name: impl Into<String>, invocation: Invocation, expect: Expectation) -> Self {
        Self {
            name: name.into(),
            invocation,
            expect,
        }
    }
}

/// A coherent test unit: steps run in order, later steps may read files earlier ones wrote.
///
/// Temporary outputs are owned by the scenario and removed when it is dropped.
#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
    outputs: Vec<TempOutput>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            outputs: Vec::new(),
        }
    }

    /// Hand `output` to this scenario so it lives exactly as long as the scenario.
    #[must_use]
    pub fn with_output(mut self, output: TempOutput) -> Self {
        self.outputs.push(output);
        self
    }

    #[must_use]
    pub fn outputs(&self) -> &[TempOutput] {
        &self.outputs
    }
}
