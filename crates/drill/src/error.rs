//! CLI error types.

use drill_config::ConfigError;
use drill_runner::{DrillError, ExcerptError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Drill(#[from] DrillError),

    #[error("{0}")]
    Excerpt(#[from] ExcerptError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    Source {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
