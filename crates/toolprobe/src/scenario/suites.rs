//! Built-in conformance suites for the checker, preview generator and info tool.
//!
//! Every builder verifies its prerequisites (tool executables, asset root,
//! samples) before returning, so nothing is invoked when the environment is
//! incomplete.

use super::{Scenario, Step};
use crate::fixtures::{require_executable, AssetRoot, TempOutput};
use crate::model::{Expectation, Invocation, ValidationMode, USAGE_BANNER};
use crate::report::Dimensions;
use crate::runner::RunnerResult;
use std::path::Path;

/// Label of the info tool's report line describing preview data.
pub const PREVIEW_LABEL: &str = "  preview";

/// Extension given to generated outputs.
pub const OUTPUT_EXTENSION: &str = ".exr";

pub const DEFAULT_PREVIEW_SAMPLE: &str = "TestImages/GrayRampsHorizontal.exr";

/// Parameters of one preview generation.
///
/// `height` is what the info tool should report; the generator derives it from
/// the sample's aspect ratio, so it equals `width` for square samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewCase {
    pub sample: String,
    pub width: u32,
    pub height: u32,
    pub exposure: String,
}

impl Default for PreviewCase {
    fn default() -> Self {
        Self {
            sample: DEFAULT_PREVIEW_SAMPLE.to_string(),
            width: 50,
            height: 50,
            exposure: "1".to_string(),
        }
    }
}

impl PreviewCase {
    #[must_use]
    pub fn for_sample(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    fn generate_step(&self, generator: &Path, input: &Path, output: &TempOutput) -> Step {
        let args = vec![
            "-w".to_string(),
            self.width.to_string(),
            "-e".to_string(),
            self.exposure.clone(),
            "-v".to_string(),
            input.display().to_string(),
            output.arg(),
        ];
        Step::new(
            "generate preview",
            Invocation::new(generator, args),
            Expectation::success(),
        )
    }
}

/// Every sample under every validation mode; a sample conforms only if all five pass.
pub fn validation_suite(
    validator: &Path,
    assets: &Path,
    samples: &[String],
) -> RunnerResult<Vec<Scenario>> {
    let validator = require_executable(validator)?;
    let root = AssetRoot::open(assets)?;
    samples
        .iter()
        .map(|sample| {
            let path = root.sample(sample)?.display().to_string();
            let steps = ValidationMode::ALL
                .iter()
                .map(|mode| {
                    Step::new(
                        mode.to_string(),
                        Invocation::new(&validator, mode.args(&path)),
                        Expectation::success(),
                    )
                })
                .collect();
            Ok(Scenario::new(sample.clone(), steps))
        })
        .collect()
}

/// Argument-error cases, then generate-then-inspect.
pub fn preview_suite(
    generator: &Path,
    info: &Path,
    assets: &Path,
    case: &PreviewCase,
) -> RunnerResult<Vec<Scenario>> {
    let generator = require_executable(generator)?;
    let info = require_executable(info)?;
    let input = AssetRoot::open(assets)?.sample(&case.sample)?;

    let usage = |name: &str, args: &[&str]| {
        Scenario::new(
            name,
            vec![Step::new(
                name,
                Invocation::new(&generator, args.iter().copied()),
                Expectation::exit(1).with_stderr_prefix(USAGE_BANNER),
            )],
        )
    };

    let output = TempOutput::allocate(OUTPUT_EXTENSION)?;
    let inspect = Step::new(
        "inspect preview",
        Invocation::new(&info, ["-v".to_string(), output.arg()]),
        Expectation::success()
            .with_field(PREVIEW_LABEL, format!("preview {}", case.dimensions())),
    );
    let chained = Scenario::new(
        "preview then inspect",
        vec![case.generate_step(&generator, &input, &output), inspect],
    )
    .with_output(output);

    Ok(vec![
        usage("usage without arguments", &[]),
        usage("usage with help flag", &["-h"]),
        chained,
    ])
}

/// A generated file must itself pass the validator's full and checksum modes.
pub fn roundtrip_suite(
    generator: &Path,
    validator: &Path,
    assets: &Path,
    case: &PreviewCase,
) -> RunnerResult<Vec<Scenario>> {
    let generator = require_executable(generator)?;
    let validator = require_executable(validator)?;
    let input = AssetRoot::open(assets)?.sample(&case.sample)?;

    let output = TempOutput::allocate(OUTPUT_EXTENSION)?;
    let generated = output.arg();
    let mut steps = vec![case.generate_step(&generator, &input, &output)];
    for mode in [ValidationMode::Full, ValidationMode::Checksum] {
        steps.push(Step::new(
            format!("validate generated ({mode})"),
            Invocation::new(&validator, mode.args(&generated)),
            Expectation::success(),
        ));
    }
    Ok(vec![
        Scenario::new("generated file validates", steps).with_output(output),
    ])
}
