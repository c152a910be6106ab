//! Extension trait for [`RunCache`] with typed convenience methods.

use std::io;

use crate::{CacheKey, RunCache, RunResult};

/// Typed access to [`RunCache`] entries.
///
/// Stores only deal with bytes so that the trait stays object-safe and
/// implementors stay small; the [`RunResult`] text format lives here, behind
/// a blanket impl.
pub trait RunCacheExt: RunCache {
    /// Load and parse a cached run.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or cannot be read.
    fn load_result(&self, key: &CacheKey) -> io::Result<RunResult> {
        let bytes = self.load(key)?;
        Ok(RunResult::from_bytes(&bytes))
    }

    /// Serialize and store a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn store_result(&self, key: &CacheKey, result: &RunResult) -> io::Result<()> {
        self.store(key, &result.to_bytes())
    }
}

impl<C: RunCache + ?Sized> RunCacheExt for C {}
