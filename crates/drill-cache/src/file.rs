//! File-based run cache.
//!
//! [`FileRunCache`] keeps one directory per drill under a build root. The
//! directory doubles as the drill's working directory, so the staged program
//! and its captured output sit next to each other:
//!
//! ```text
//! {root}/
//! +-- double/            # stem of drill/double.go
//! |   +-- double.go      # staged program (only while it runs)
//! |   +-- output.txt     # cached run
//! +-- flag_types/
//!     +-- output.txt
//! ```
//!
//! Writes go to a temporary sibling file which is then renamed over
//! `output.txt`, so an interrupted write never leaves a truncated entry that
//! would later pass the freshness check.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{CacheKey, RunCache};

/// Name of the cached output file inside a drill directory.
pub const OUTPUT_FILENAME: &str = "output.txt";

/// Temporary name used while writing [`OUTPUT_FILENAME`].
pub(crate) const PARTIAL_FILENAME: &str = "output.txt.partial";

/// File-based [`RunCache`] rooted at a build directory.
#[derive(Clone, Debug)]
pub struct FileRunCache {
    root: PathBuf,
}

impl FileRunCache {
    /// Create a cache rooted at `root`. Nothing is created until a store.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working directory of a drill (`{root}/{stem}`).
    #[must_use]
    pub fn work_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.stem())
    }

    /// Path of the cached output file of a drill.
    #[must_use]
    pub fn output_path(&self, key: &CacheKey) -> PathBuf {
        self.work_dir(key).join(OUTPUT_FILENAME)
    }
}

impl RunCache for FileRunCache {
    fn modified(&self, key: &CacheKey) -> Option<SystemTime> {
        fs::metadata(self.output_path(key))
            .and_then(|meta| meta.modified())
            .ok()
    }

    fn load(&self, key: &CacheKey) -> io::Result<Vec<u8>> {
        fs::read(self.output_path(key))
    }

    fn store(&self, key: &CacheKey, contents: &[u8]) -> io::Result<()> {
        let dir = self.work_dir(key);
        fs::create_dir_all(&dir)?;

        let partial = dir.join(PARTIAL_FILENAME);
        fs::write(&partial, contents)?;
        if let Err(e) = fs::rename(&partial, dir.join(OUTPUT_FILENAME)) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        tracing::debug!(
            "cached {} bytes for {} in {}",
            contents.len(),
            key.stem(),
            dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn key(entry: &str) -> CacheKey {
        CacheKey::for_entry(Path::new(entry)).unwrap()
    }

    #[test]
    fn test_store_and_load() {
        let tmp = TempDir::new().unwrap();
        let cache = FileRunCache::new(tmp.path().join("build"));
        let key = key("drill/double.go");

        cache.store(&key, b"$ go run double.go\n4\n").unwrap();

        assert_eq!(cache.load(&key).unwrap(), b"$ go run double.go\n4\n".to_vec());
    }

    #[test]
    fn test_layout_uses_stem_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("build");
        let cache = FileRunCache::new(root.clone());
        let key = key("drill/json_encode.go");

        cache.store(&key, b"$ go run json_encode.go\n{}\n").unwrap();

        assert_eq!(cache.work_dir(&key), root.join("json_encode"));
        assert_eq!(
            fs::read_to_string(root.join("json_encode/output.txt")).unwrap(),
            "$ go run json_encode.go\n{}\n"
        );
        assert!(!root.join("json_encode").join(PARTIAL_FILENAME).exists());
    }

    #[test]
    fn test_modified_tracks_output_file() {
        let tmp = TempDir::new().unwrap();
        let cache = FileRunCache::new(tmp.path());
        let key = key("drill/logging.go");

        assert_eq!(cache.modified(&key), None);

        cache.store(&key, b"$ go run logging.go\n").unwrap();
        let expected = fs::metadata(cache.output_path(&key))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(cache.modified(&key), Some(expected));
    }

    #[test]
    fn test_store_overwrites() {
        let tmp = TempDir::new().unwrap();
        let cache = FileRunCache::new(tmp.path());
        let key = key("drill/openfile.go");

        cache.store(&key, b"first").unwrap();
        cache.store(&key, b"second").unwrap();

        assert_eq!(cache.load(&key).unwrap(), b"second".to_vec());
    }

    #[test]
    fn test_load_missing_entry_fails() {
        let tmp = TempDir::new().unwrap();
        let cache = FileRunCache::new(tmp.path());

        let err = cache.load(&key("drill/ghost.go")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_store_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("build");
        fs::write(&root, b"not a directory").unwrap();
        let cache = FileRunCache::new(root);

        assert!(cache.store(&key("drill/double.go"), b"x").is_err());
    }
}
