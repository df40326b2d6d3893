//! Declarative suites loaded from YAML or JSON.
//!
//! ```yaml
//! suite_version: 1
//! assets: ./images
//! tools:
//!   check: /usr/local/bin/exrcheck
//!   preview: /usr/local/bin/exrmakepreview
//! scenarios:
//!   - name: preview validates
//!     outputs:
//!       out: { extension: ".exr" }
//!     steps:
//!       - { name: generate, tool: preview, args: ["-w", "50", "{asset:a.exr}", "{output:out}"] }
//!       - { name: check, tool: check, args: ["-c", "{output:out}"] }
//! ```
//!
//! Relative `assets` and tool paths are resolved against the directory that
//! contains the suite file.

use super::suites::OUTPUT_EXTENSION;
use super::{Scenario, Step};
use crate::fixtures::{require_executable, AssetRoot, TempOutput};
use crate::model::{Expectation, Invocation};
use crate::runner::{RunnerError, RunnerResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const SUITE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteFile {
    #[serde(default = "default_suite_version")]
    pub suite_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<PathBuf>,
    pub tools: BTreeMap<String, PathBuf>,
    pub scenarios: Vec<ScenarioEntry>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, OutputEntry>,
    pub steps: Vec<StepEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputEntry {
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepEntry {
    pub name: String,
    pub tool: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub expect: Expectation,
}

fn default_suite_version() -> u32 {
    SUITE_VERSION
}

fn default_extension() -> String {
    OUTPUT_EXTENSION.to_string()
}

/// Read a suite file; `.yaml`/`.yml` parse as YAML, anything else as JSON.
pub fn load_suite_file(path: &Path) -> RunnerResult<SuiteFile> {
    if !path.is_file() {
        return Err(RunnerError::missing_path("suite file", path));
    }
    let data = std::fs::read_to_string(path)
        .map_err(|err| RunnerError::io("failed to read suite file", err))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let parsed: Result<SuiteFile, String> = if is_yaml {
        serde_yml::from_str(&data).map_err(|err| err.to_string())
    } else {
        serde_json::from_str(&data).map_err(|err| err.to_string())
    };
    let mut suite = parsed.map_err(|err| {
        RunnerError::suite(
            format!("failed to parse suite file {}", path.display()),
            Some(serde_json::json!({ "path": path.display().to_string(), "source": err })),
        )
    })?;
    suite.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    suite.validate()?;
    tracing::debug!(path = %path.display(), scenarios = suite.scenarios.len(), "loaded suite file");
    Ok(suite)
}

impl SuiteFile {
    fn validate(&self) -> RunnerResult<()> {
        if self.suite_version != SUITE_VERSION {
            return Err(RunnerError::suite(
                format!(
                    "unsupported suite_version {} (expected {SUITE_VERSION})",
                    self.suite_version
                ),
                None,
            ));
        }
        if self.scenarios.is_empty() {
            return Err(RunnerError::suite("suite declares no scenarios", None));
        }
        for scenario in &self.scenarios {
            if scenario.steps.is_empty() {
                return Err(RunnerError::suite(
                    format!("scenario {:?} has no steps", scenario.name),
                    None,
                ));
            }
            for step in &scenario.steps {
                if !self.tools.contains_key(&step.tool) {
                    return Err(RunnerError::suite(
                        format!(
                            "step {:?} of scenario {:?} uses undeclared tool {:?}",
                            step.name, scenario.name, step.tool
                        ),
                        None,
                    ));
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Resolve tools and samples, allocate outputs and build runnable scenarios.
    ///
    /// Every tool and every referenced sample is verified here, before
    /// anything runs.
    pub fn into_scenarios(self) -> RunnerResult<Vec<Scenario>> {
        let tools = self
            .tools
            .iter()
            .map(|(name, path)| Ok((name.as_str(), require_executable(&self.resolve(path))?)))
            .collect::<RunnerResult<BTreeMap<&str, PathBuf>>>()?;
        let assets = self
            .assets
            .as_deref()
            .map(|dir| AssetRoot::open(self.resolve(dir)))
            .transpose()?;

        let mut scenarios = Vec::with_capacity(self.scenarios.len());
        for entry in &self.scenarios {
            let outputs = entry
                .outputs
                .iter()
                .map(|(name, output)| Ok((name.clone(), TempOutput::allocate(&output.extension)?)))
                .collect::<RunnerResult<BTreeMap<String, TempOutput>>>()?;
            let placeholders = Placeholders {
                assets: assets.as_ref(),
                outputs: &outputs,
            };

            let mut steps = Vec::with_capacity(entry.steps.len());
            for step in &entry.steps {
                let program = tools.get(step.tool.as_str()).ok_or_else(|| {
                    RunnerError::suite(format!("undeclared tool {:?}", step.tool), None)
                })?;
                let args = step
                    .args
                    .iter()
                    .map(|arg| placeholders.expand(arg))
                    .collect::<RunnerResult<Vec<String>>>()?;
                steps.push(Step::new(
                    step.name.clone(),
                    Invocation::new(program, args),
                    step.expect.clone(),
                ));
            }

            scenarios.push(
                outputs
                    .into_values()
                    .fold(Scenario::new(entry.name.clone(), steps), Scenario::with_output),
            );
        }
        Ok(scenarios)
    }
}

struct Placeholders<'a> {
    assets: Option<&'a AssetRoot>,
    outputs: &'a BTreeMap<String, TempOutput>,
}

impl Placeholders<'_> {
    /// Replace every `{asset:REL}` and `{output:NAME}` in `arg`.
    fn expand(&self, arg: &str) -> RunnerResult<String> {
        let Some(pattern) = placeholder_pattern() else {
            return Ok(arg.to_string());
        };
        let mut expanded = String::with_capacity(arg.len());
        let mut last = 0;
        for caps in pattern.captures_iter(arg) {
            let (Some(whole), Some(kind), Some(value)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            expanded.push_str(arg.get(last..whole.start()).unwrap_or_default());
            expanded.push_str(&self.lookup(kind.as_str(), value.as_str())?);
            last = whole.end();
        }
        expanded.push_str(arg.get(last..).unwrap_or_default());
        Ok(expanded)
    }

    fn lookup(&self, kind: &str, value: &str) -> RunnerResult<String> {
        match kind {
            "asset" => {
                let root = self.assets.ok_or_else(|| {
                    RunnerError::suite(
                        format!("{{asset:{value}}} used but the suite declares no assets"),
                        None,
                    )
                })?;
                Ok(root.sample(value)?.display().to_string())
            }
            "output" => self.outputs.get(value).map(TempOutput::arg).ok_or_else(|| {
                RunnerError::suite(format!("undeclared output {value:?}"), None)
            }),
            other => Err(RunnerError::suite(
                format!("unknown placeholder kind {other:?}"),
                None,
            )),
        }
    }
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([a-z]+):([^{}]+)\}").ok())
        .as_ref()
}
