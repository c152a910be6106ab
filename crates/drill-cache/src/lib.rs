//! Run-output cache for drill programs.
//!
//! A drill is a small example program whose captured output is embedded in a
//! documentation page. Running it is slow, so the captured output is cached
//! and reused until the drill source changes. This crate holds the pieces of
//! that cache that do not depend on how drills are built or executed:
//!
//! - [`CacheKey`]: Identity of a drill, derived from its entry file
//! - [`RunResult`]: Invocation line plus combined output, with its text format
//! - [`RunCache`]: Backing store for serialized results
//! - [`freshness::check`]: Pure rebuild decision from two timestamps
//!
//! # Implementations
//!
//! - [`FileRunCache`]: `<root>/<stem>/output.txt` on disk
//! - [`MemoryRunCache`]: In-memory map, for tests and dry runs
//! - [`NullRunCache`]: Always misses (caching disabled)
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use drill_cache::{CacheKey, MemoryRunCache, RunCache, RunCacheExt, RunResult};
//!
//! let cache = MemoryRunCache::new();
//! let key = CacheKey::for_entry(Path::new("drill/double.go")).unwrap();
//! cache
//!     .store_result(&key, &RunResult::new("go run double.go", b"4\n".to_vec()))
//!     .unwrap();
//!
//! let result = cache.load_result(&key).unwrap();
//! assert_eq!(result.output(), b"4\n");
//! ```

mod ext;
mod file;
pub mod freshness;
mod key;
mod memory;
mod result;

use std::io;
use std::time::SystemTime;

pub use ext::RunCacheExt;
pub use file::{FileRunCache, OUTPUT_FILENAME};
pub use key::CacheKey;
pub use memory::MemoryRunCache;
pub use result::{PROMPT, RunResult};

/// Backing store for serialized drill runs.
///
/// Values are the raw bytes of a [`RunResult`] (see [`RunResult::to_bytes`]).
/// Stores only keep bytes and a modification time; deciding whether an entry
/// is still usable is left to [`freshness::check`].
///
/// The store is not locked. Two callers writing the same key at the same time
/// race and the last write wins.
pub trait RunCache: Send + Sync {
    /// Modification time of the stored entry.
    ///
    /// Returns `None` when the entry does not exist or its time cannot be
    /// determined. Callers treat both cases as a miss.
    fn modified(&self, key: &CacheKey) -> Option<SystemTime>;

    /// Read the stored bytes for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or cannot be read.
    fn load(&self, key: &CacheKey) -> io::Result<Vec<u8>>;

    /// Store `contents` for `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn store(&self, key: &CacheKey, contents: &[u8]) -> io::Result<()>;
}

/// No-op [`RunCache`] that never holds an entry.
///
/// Every lookup misses, so every run rebuilds; stores are discarded.
#[derive(Debug, Default)]
pub struct NullRunCache;

impl RunCache for NullRunCache {
    fn modified(&self, _key: &CacheKey) -> Option<SystemTime> {
        None
    }

    fn load(&self, key: &CacheKey) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no cached run for {}", key.stem()),
        ))
    }

    fn store(&self, _key: &CacheKey, _contents: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullRunCache;
        let key = CacheKey::for_entry(Path::new("drill/double.go")).unwrap();

        assert_eq!(cache.modified(&key), None);

        cache.store(&key, b"$ go run double.go\n4\n").unwrap();
        assert_eq!(cache.modified(&key), None);
        assert_eq!(
            cache.load(&key).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
