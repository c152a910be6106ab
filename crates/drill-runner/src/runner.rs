//! Cached drill execution.
//!
//! [`CachedRunner::run_cached`] returns the captured output of a drill,
//! rerunning it only when its entry file changed after the last capture:
//!
//! 1. Derive the working directory `{build_root}/{stem}` from the entry file
//! 2. Reuse the cached run if it is at least as new as the entry file
//! 3. Otherwise transform the entry file, stage it in the working directory,
//!    run it through the toolchain, and cache `$ <invocation>\n<output>`
//!
//! The staged program is removed when the request completes; only the
//! captured output is kept.
//!
//! Calls are expected to be sequential. Nothing guards a working directory
//! against two concurrent calls for the same drill.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use drill_cache::freshness::{self, Freshness};
use drill_cache::{CacheKey, FileRunCache, RunCache, RunResult};

use crate::error::DrillError;
use crate::process::{ProcessError, ProcessRunner, SystemProcessRunner, Toolchain};
use crate::source::{FsSourceLoader, SourceLoader};
use crate::transform::SnippetTransformer;

/// Where the bytes of a [`Captured`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Reused from the cache; no process was spawned.
    Cache,
    /// Produced by running the drill now.
    Fresh,
}

/// Output of [`CachedRunner::run_cached`].
#[derive(Debug)]
pub struct Captured {
    /// `$ <invocation>\n` followed by the combined program output.
    pub bytes: Vec<u8>,
    /// Whether the bytes were reused or freshly produced.
    pub origin: Origin,
    /// Why a fresh run failed, if it did.
    ///
    /// The failure text is part of `bytes` as well; callers log this and
    /// still render the output.
    pub failure: Option<ProcessError>,
}

impl Captured {
    /// Parse the captured bytes.
    #[must_use]
    pub fn result(&self) -> RunResult {
        RunResult::from_bytes(&self.bytes)
    }
}

/// Builds, runs and caches drill programs.
pub struct CachedRunner {
    build_root: PathBuf,
    toolchain: Toolchain,
    transformer: SnippetTransformer,
    source: Arc<dyn SourceLoader>,
    cache: Arc<dyn RunCache>,
    process: Arc<dyn ProcessRunner>,
}

impl CachedRunner {
    /// Create a runner working under `build_root`.
    ///
    /// Defaults to the filesystem for sources and cache, real processes and
    /// the default markers.
    #[must_use]
    pub fn new(build_root: impl Into<PathBuf>, toolchain: Toolchain) -> Self {
        let build_root = build_root.into();
        Self {
            cache: Arc::new(FileRunCache::new(build_root.clone())),
            build_root,
            toolchain,
            transformer: SnippetTransformer::default(),
            source: Arc::new(FsSourceLoader),
            process: Arc::new(SystemProcessRunner),
        }
    }

    /// Use a different snippet transformer.
    #[must_use]
    pub fn with_transformer(mut self, transformer: SnippetTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Use a different source loader.
    #[must_use]
    pub fn with_source_loader(mut self, source: Arc<dyn SourceLoader>) -> Self {
        self.source = source;
        self
    }

    /// Use a different cache store.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn RunCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a different process runner.
    #[must_use]
    pub fn with_process_runner(mut self, process: Arc<dyn ProcessRunner>) -> Self {
        self.process = process;
        self
    }

    /// Build root directory.
    #[must_use]
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Working directory of a drill.
    #[must_use]
    pub fn work_dir(&self, key: &CacheKey) -> PathBuf {
        self.build_root.join(key.stem())
    }

    /// Return the captured run of a drill, running it if the cache is stale.
    ///
    /// `files[0]` is the entry file; further files are accepted but only the
    /// entry file is staged and run. `args` is split on whitespace and passed
    /// to the program after the staged file name.
    ///
    /// # Errors
    ///
    /// Returns an error if `files` is empty, the entry file has no usable
    /// name, or reading, staging or caching fails. A program that fails to
    /// start or exits unsuccessfully is not an error: its output is returned
    /// with [`Captured::failure`] set.
    pub fn run_cached<P: AsRef<Path>>(
        &self,
        args: &str,
        files: &[P],
    ) -> Result<Captured, DrillError> {
        let entry = files.first().ok_or(DrillError::NoFiles)?.as_ref();
        let key = CacheKey::for_entry(entry)
            .ok_or_else(|| DrillError::InvalidEntry(entry.to_path_buf()))?;

        let source_mtime = self.source.modified(entry).ok();
        match freshness::check(source_mtime, self.cache.modified(&key)) {
            Freshness::Fresh => {
                tracing::debug!("using cached run of {}", entry.display());
                let bytes = self
                    .cache
                    .load(&key)
                    .map_err(|source| DrillError::LoadCache {
                        path: entry.to_path_buf(),
                        source,
                    })?;
                Ok(Captured {
                    bytes,
                    origin: Origin::Cache,
                    failure: None,
                })
            }
            Freshness::Stale(reason) => {
                tracing::debug!("rebuilding {} ({reason:?})", entry.display());
                self.rebuild(args, entry, &key)
            }
        }
    }

    fn rebuild(&self, args: &str, entry: &Path, key: &CacheKey) -> Result<Captured, DrillError> {
        let source = self.source.read(entry).map_err(|source| DrillError::Read {
            path: entry.to_path_buf(),
            source,
        })?;

        let transformed = self.transformer.transform(&source);
        if let Some(marker) = self.transformer.missing_marker(&transformed) {
            if self.transformer.is_strict() {
                return Err(DrillError::MissingMarker {
                    path: entry.to_path_buf(),
                    marker: marker.to_owned(),
                });
            }
            tracing::warn!(
                "{} does not contain `{marker}`, staging it anyway",
                entry.display()
            );
        }

        let work_dir = self.work_dir(key);
        fs::create_dir_all(&work_dir).map_err(|source| DrillError::CreateDir {
            path: work_dir.clone(),
            source,
        })?;

        let staged = StagedFile::write(work_dir.join(key.file_name()), &transformed.bytes)?;
        tracing::info!("staged {}", staged.path.display());

        let invocation = self.toolchain.invocation(key.file_name(), args, work_dir);
        let output = self.process.run(&invocation);
        if let Some(failure) = &output.failure {
            tracing::debug!("{}: {failure}", entry.display());
        }

        let result = RunResult::new(self.toolchain.command_line(&invocation), output.combined);
        let bytes = result.to_bytes();
        self.cache
            .store(key, &bytes)
            .map_err(|source| DrillError::StoreCache {
                path: entry.to_path_buf(),
                source,
            })?;

        Ok(Captured {
            bytes,
            origin: Origin::Fresh,
            failure: output.failure,
        })
    }
}

/// Transformed program written into a working directory, removed on drop.
struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    fn write(path: PathBuf, contents: &[u8]) -> Result<Self, DrillError> {
        match fs::write(&path, contents) {
            Ok(()) => Ok(Self { path }),
            Err(source) => Err(DrillError::Stage { path, source }),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("failed to remove {}: {e}", self.path.display());
        }
    }
}
