//! In-memory run cache.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::SystemTime;

use crate::{CacheKey, RunCache};

/// In-memory [`RunCache`] keyed by canonical entry path.
///
/// Entries are stamped with [`SystemTime::now`] on store. Use
/// [`with_entry`](Self::with_entry) to seed an entry with an explicit
/// modification time.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use std::time::SystemTime;
/// use drill_cache::{CacheKey, MemoryRunCache, RunCache};
///
/// let key = CacheKey::for_entry(Path::new("drill/double.go")).unwrap();
/// let cache = MemoryRunCache::new().with_entry(&key, b"$ go run double.go\n4\n", SystemTime::UNIX_EPOCH);
///
/// assert_eq!(cache.modified(&key), Some(SystemTime::UNIX_EPOCH));
/// ```
#[derive(Debug, Default)]
pub struct MemoryRunCache {
    entries: RwLock<HashMap<PathBuf, (SystemTime, Vec<u8>)>>,
}

impl MemoryRunCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with an explicit modification time.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_entry(self, key: &CacheKey, contents: &[u8], modified: SystemTime) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(key.entry().to_path_buf(), (modified, contents.to_vec()));
        self
    }

    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RunCache for MemoryRunCache {
    fn modified(&self, key: &CacheKey) -> Option<SystemTime> {
        let entries = self.entries.read().ok()?;
        entries.get(key.entry()).map(|(modified, _)| *modified)
    }

    fn load(&self, key: &CacheKey) -> io::Result<Vec<u8>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| io::Error::other("run cache lock poisoned"))?;
        entries
            .get(key.entry())
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no cached run for {}", key.entry().display()),
                )
            })
    }

    fn store(&self, key: &CacheKey, contents: &[u8]) -> io::Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| io::Error::other("run cache lock poisoned"))?;
        entries.insert(
            key.entry().to_path_buf(),
            (SystemTime::now(), contents.to_vec()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_store_stamps_current_time() {
        let cache = MemoryRunCache::new();
        let key = CacheKey::for_entry(Path::new("drill/double.go")).unwrap();
        let before = SystemTime::now();

        cache.store(&key, b"$ go run double.go\n4\n").unwrap();

        assert!(cache.modified(&key).unwrap() >= before);
        assert_eq!(cache.load(&key).unwrap(), b"$ go run double.go\n4\n".to_vec());
    }

    #[test]
    fn test_keys_by_entry_not_stem() {
        // Same stem, different directories
        let a = CacheKey::for_entry(Path::new("drill/logging.go")).unwrap();
        let b = CacheKey::for_entry(Path::new("other/logging.go")).unwrap();
        let cache = MemoryRunCache::new();

        cache.store(&a, b"a").unwrap();
        cache.store(&b, b"b").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.load(&a).unwrap(), b"a".to_vec());
        assert_eq!(cache.load(&b).unwrap(), b"b".to_vec());
    }

    #[test]
    fn test_missing_entry() {
        let cache = MemoryRunCache::new();
        let key = CacheKey::for_entry(Path::new("drill/ghost.go")).unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.modified(&key), None);
        assert_eq!(cache.load(&key).unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
