//! Error types for drill builds.

use std::io;
use std::path::PathBuf;

/// Failure to build or serve a drill run.
///
/// These abort the current drill. A drill program that runs and fails is not
/// an error here; see [`Captured::failure`](crate::Captured::failure).
#[derive(Debug, thiserror::Error)]
pub enum DrillError {
    /// No source files were given.
    #[error("no drill files given")]
    NoFiles,

    /// The entry file name is not valid UTF-8, yields no working directory
    /// name, or collides with the cached output file name.
    #[error("invalid drill entry file: {}", .0.display())]
    InvalidEntry(PathBuf),

    /// The entry file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Strict mode: the snippet lacks a marker.
    #[error("{} does not contain `{marker}`", path.display())]
    MissingMarker { path: PathBuf, marker: String },

    /// The working directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transformed program could not be written.
    #[error("failed to stage {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A fresh cache entry could not be read back.
    #[error("failed to load cached run of {}: {source}", path.display())]
    LoadCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The captured run could not be written to the cache.
    #[error("failed to cache run of {}: {source}", path.display())]
    StoreCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
