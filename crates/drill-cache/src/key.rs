//! Cache key derivation from a drill's entry file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::file::{OUTPUT_FILENAME, PARTIAL_FILENAME};

/// Identity of a drill in the cache.
///
/// Derived from the entry file of a drill:
/// - `entry`: canonical path of the entry file (the path as given when it
///   cannot be canonicalized, e.g. because it does not exist yet)
/// - `file_name`: entry file name as given
/// - `stem`: file name up to, but excluding, its first `.`
///
/// The stem names the working directory of a drill, so several files of one
/// logical program (`serve.go`, `serve.test.go`) share a directory. Two entry
/// files with the same stem in different directories share it too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entry: PathBuf,
    file_name: String,
    stem: String,
}

impl CacheKey {
    /// Derive the key for an entry file.
    ///
    /// Returns `None` if the path has no file name, the file name is not
    /// valid UTF-8, the stem is empty (e.g. `.hidden`), or the file name is
    /// reserved for the cached output (`output.txt`, `output.txt.partial`).
    /// A file name without `.` uses the whole name as stem.
    #[must_use]
    pub fn for_entry(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name == OUTPUT_FILENAME || name == PARTIAL_FILENAME {
            return None;
        }
        let stem = name.split('.').next().unwrap_or(name);
        if stem.is_empty() {
            return None;
        }
        let entry = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Some(Self {
            entry,
            file_name: name.to_owned(),
            stem: stem.to_owned(),
        })
    }

    /// Canonical entry file path.
    #[must_use]
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Working directory name of the drill.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// File name of the entry file as given (e.g. `double.go`).
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}
