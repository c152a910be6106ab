//! Access to drill source files.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Reads drill sources and reports when they last changed.
pub trait SourceLoader: Send + Sync {
    /// Read the raw bytes of a source file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Modification time of a source file.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`SourceLoader`] backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }
}
