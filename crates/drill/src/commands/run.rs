//! `drill run` command implementation.

use std::path::PathBuf;

use clap::Args;
use drill_config::{CliSettings, Config};
use drill_runner::{Captured, Origin};
use serde::Serialize;

use crate::commands::runner_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the run command.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// Drill files; the first one is the entry file.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Arguments for the drill program, separated by spaces.
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    args: String,

    /// Build directory (overrides config).
    #[arg(short, long)]
    build_root: Option<PathBuf>,

    /// Toolchain program (overrides config).
    #[arg(long)]
    program: Option<String>,

    /// Fail when a drill lacks the hook or package marker.
    #[arg(long)]
    strict: bool,

    /// Print a JSON report instead of the captured output.
    #[arg(long)]
    json: bool,

    /// Path to configuration file (default: auto-discover drill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (log rebuilds).
    #[arg(short, long)]
    pub verbose: bool,
}

/// JSON form of a captured run.
#[derive(Debug, Serialize)]
struct RunReport {
    entry: PathBuf,
    cached: bool,
    invocation: String,
    output: String,
    failure: Option<String>,
}

impl RunReport {
    fn new(entry: PathBuf, captured: &Captured) -> Self {
        let result = captured.result();
        Self {
            entry,
            cached: captured.origin == Origin::Cache,
            invocation: result.invocation().to_owned(),
            output: String::from_utf8_lossy(result.output()).into_owned(),
            failure: captured.failure.as_ref().map(ToString::to_string),
        }
    }
}

impl RunArgs {
    /// Execute the run command.
    ///
    /// A drill that fails to run is reported as a warning; its output is
    /// still printed and the command succeeds.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            build_root: self.build_root,
            program: self.program,
            strict_markers: self.strict.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let runner = runner_from_config(&config);

        let captured = runner.run_cached(&self.args, &self.files)?;
        let entry = self.files[0].clone();

        if captured.origin == Origin::Cache {
            output.status(&format!("{}: cached", entry.display()));
        }
        if let Some(failure) = &captured.failure {
            output.warning(&format!("{}: {failure}", entry.display()));
        }

        if self.json {
            let report = RunReport::new(entry, &captured);
            let mut json = serde_json::to_vec_pretty(&report)?;
            json.push(b'\n');
            output.emit(&json)?;
        } else {
            output.emit(&captured.bytes)?;
        }
        Ok(())
    }
}
