//! `drill excerpt` command implementation.

use std::path::PathBuf;

use clap::Args;
use drill_runner::{LineSpan, excerpt};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the excerpt command.
#[derive(Args)]
pub(crate) struct ExcerptArgs {
    /// Source file to excerpt.
    file: PathBuf,

    /// Lines to keep: `N`, `N-M`, `N-` or `-M` (default: whole file).
    #[arg(short, long, default_value_t = LineSpan::ALL, allow_hyphen_values = true)]
    lines: LineSpan,
}

impl ExcerptArgs {
    /// Execute the excerpt command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let text = std::fs::read_to_string(&self.file).map_err(|source| CliError::Source {
            path: self.file.clone(),
            source,
        })?;
        Output::new().emit(excerpt(&text, self.lines).as_bytes())?;
        Ok(())
    }
}
