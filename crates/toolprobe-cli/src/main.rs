//! Toolprobe CLI: conformance runs against command-line image tools.
//!
//! Every subcommand takes positional arguments only. Tunables come from the
//! environment (`TOOLPROBE_TIMEOUT_MS`, `TOOLPROBE_LOG`, `NO_COLOR`).

// CLI-specific lint allowances (CLI binary, not library)
#![allow(missing_docs)]
#![allow(clippy::print_stdout)] // CLI must print to stdout
#![allow(clippy::print_stderr)] // CLI must print to stderr
#![allow(clippy::exit)] // CLI uses exit codes

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolprobe::config::HarnessConfig;
use toolprobe::run::run_suite_with_options;
use toolprobe::runner::{RunnerOptions, RunnerResult};
use toolprobe::scenario::suites::DEFAULT_PREVIEW_SAMPLE;
use toolprobe::scenario::{
    load_suite_file, preview_suite, roundtrip_suite, validation_suite, PreviewCase,
};
use toolprobe::{RunReport, Scenario};
use tracing_subscriber::EnvFilter;

/// Log filter variable; falls back to `RUST_LOG`.
const LOG_ENV: &str = "TOOLPROBE_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "toolprobe",
    version,
    about = "Conformance harness for command-line image tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every validation mode of a checker against each sample
    Check {
        /// Checker executable
        validator: PathBuf,
        /// Directory the samples are resolved against
        assets: PathBuf,
        /// Sample paths relative to ASSETS
        #[arg(required = true)]
        samples: Vec<String>,
    },
    /// Check a preview generator's usage errors and the preview it writes
    Preview {
        /// Preview generator executable
        generator: PathBuf,
        /// Info/dump executable used to inspect the generated file
        info: PathBuf,
        /// Directory the sample is resolved against
        assets: PathBuf,
        /// Sample path relative to ASSETS
        #[arg(default_value = DEFAULT_PREVIEW_SAMPLE)]
        sample: String,
    },
    /// Check that a generated file passes the checker
    Roundtrip {
        /// Preview generator executable
        generator: PathBuf,
        /// Checker executable
        validator: PathBuf,
        /// Directory the sample is resolved against
        assets: PathBuf,
        /// Sample path relative to ASSETS
        #[arg(default_value = DEFAULT_PREVIEW_SAMPLE)]
        sample: String,
    },
    /// Run scenarios declared in a YAML or JSON suite file
    Run {
        /// Suite file (.yaml, .yml or .json)
        suite: PathBuf,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

mod progress;

/// Configure miette's color from `NO_COLOR` and the terminal; returns whether color is on.
fn configure_colors() -> bool {
    let use_color = if std::env::var_os("NO_COLOR").is_some() {
        false
    } else {
        // Diagnostics go to stderr
        supports_color::on(supports_color::Stream::Stderr).is_some()
    };

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(use_color)
                .unicode(use_color)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set
    use_color
}

fn init_tracing(use_color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let use_color = configure_colors();
    init_tracing(use_color);
    match cli.command {
        Commands::Check {
            validator,
            assets,
            samples,
        } => cmd_check(&validator, &assets, &samples, use_color),
        Commands::Preview {
            generator,
            info,
            assets,
            sample,
        } => cmd_preview(&generator, &info, &assets, sample, use_color),
        Commands::Roundtrip {
            generator,
            validator,
            assets,
            sample,
        } => cmd_roundtrip(&generator, &validator, &assets, sample, use_color),
        Commands::Run { suite } => cmd_run(&suite, use_color),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

fn cmd_check(validator: &Path, assets: &Path, samples: &[String], color: bool) -> Result<()> {
    announce(
        "check",
        [validator.display().to_string(), assets.display().to_string()]
            .into_iter()
            .chain(samples.iter().cloned()),
    );
    emit_result(validation_suite(validator, assets, samples).and_then(|s| execute(s, color)))
}

fn cmd_preview(
    generator: &Path,
    info: &Path,
    assets: &Path,
    sample: String,
    color: bool,
) -> Result<()> {
    announce(
        "preview",
        [
            generator.display().to_string(),
            info.display().to_string(),
            assets.display().to_string(),
            sample.clone(),
        ],
    );
    let case = PreviewCase::for_sample(sample);
    emit_result(preview_suite(generator, info, assets, &case).and_then(|s| execute(s, color)))
}

fn cmd_roundtrip(
    generator: &Path,
    validator: &Path,
    assets: &Path,
    sample: String,
    color: bool,
) -> Result<()> {
    announce(
        "roundtrip",
        [
            generator.display().to_string(),
            validator.display().to_string(),
            assets.display().to_string(),
            sample.clone(),
        ],
    );
    let case = PreviewCase::for_sample(sample);
    emit_result(
        roundtrip_suite(generator, validator, assets, &case).and_then(|s| execute(s, color)),
    )
}

fn cmd_run(suite: &Path, color: bool) -> Result<()> {
    announce("run", [suite.display().to_string()]);
    emit_result(
        load_suite_file(suite)
            .and_then(toolprobe::scenario::SuiteFile::into_scenarios)
            .and_then(|s| execute(s, color)),
    )
}

/// Generate shell completions for the specified shell.
fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn announce(subcommand: &str, args: impl IntoIterator<Item = String>) {
    let args: Vec<String> = args.into_iter().collect();
    println!("testing {subcommand}: {}", args.join(" "));
}

/// Run `scenarios` with configuration from the environment and live progress on stderr.
fn execute(scenarios: Vec<Scenario>, color: bool) -> RunnerResult<RunReport> {
    let config = HarnessConfig::from_env()?;
    let options = RunnerOptions {
        progress: Some(Arc::new(progress::VerboseProgress::new(color))),
    };
    run_suite_with_options(scenarios, &config, options)
}

/// Print the outcome. Failures exit with the error code's status.
///
/// Scenarios are consumed by the run, so their temporary outputs are already
/// gone by the time this exits.
fn emit_result(result: RunnerResult<RunReport>) -> Result<()> {
    match result {
        Ok(report) => {
            match serde_json::to_string(&report) {
                Ok(json) => tracing::debug!(report = %json, "run report"),
                Err(err) => tracing::warn!(%err, "failed to serialize run report"),
            }
            println!("success.");
            Ok(())
        }
        Err(err) => {
            let exit_code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(exit_code);
        }
    }
}
