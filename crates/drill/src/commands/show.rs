//! `drill show` command implementation.

use std::path::PathBuf;

use clap::Args;
use drill_config::Config;
use drill_runner::DrillDoc;

use crate::commands::transformer_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Drill source file.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover drill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ShowArgs {
    /// Execute the show command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let source = std::fs::read_to_string(&self.file).map_err(|source| CliError::Source {
            path: self.file.clone(),
            source,
        })?;
        let doc = DrillDoc::parse(&source, &transformer_from_config(&config))?;

        output.emit(render(&doc).as_bytes())?;
        Ok(())
    }
}

fn render(doc: &DrillDoc) -> String {
    let mut out = String::new();
    if let Some(section) = &doc.section {
        out.push_str(&format!("[{section}]\n"));
    }
    out.push_str(&format!("# {}\n\n", doc.title));
    if !doc.description.is_empty() {
        out.push_str(&doc.description);
        out.push_str("\n\n");
    }
    out.push_str(&doc.body);
    out
}
