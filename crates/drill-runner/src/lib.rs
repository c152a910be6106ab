//! Build, run and cache drill programs.
//!
//! Drills are small example programs shown on documentation pages together
//! with their output. This crate turns a drill snippet into a runnable
//! program, runs it through an external toolchain and caches what it printed,
//! so a site build only reruns drills whose source changed.
//!
//! # Architecture
//!
//! - [`SnippetTransformer`]: rewrites the hook and package markers of a drill
//! - [`SourceLoader`]: reads drill sources and their modification times
//! - [`ProcessRunner`]: runs a [`Toolchain`] invocation, capturing all output
//! - [`CachedRunner`]: ties the above to a [`drill_cache::RunCache`]
//! - [`excerpt`] / [`DrillDoc`]: source excerpts for the page itself
//!
//! # Example
//!
//! ```ignore
//! use drill_runner::{CachedRunner, Toolchain};
//!
//! let runner = CachedRunner::new("build", Toolchain::default());
//! let captured = runner.run_cached("", &["drill/double.go"])?;
//! if let Some(failure) = &captured.failure {
//!     tracing::warn!("drill failed: {failure}");
//! }
//! println!("{}", String::from_utf8_lossy(&captured.bytes));
//! ```

mod error;
mod excerpt;
mod process;
mod runner;
mod source;
mod transform;

pub use error::DrillError;
pub use excerpt::{DrillDoc, ExcerptError, LineSpan, excerpt};
pub use process::{
    Invocation, ProcessError, ProcessOutput, ProcessRunner, SystemProcessRunner, Toolchain,
};
pub use runner::{CachedRunner, Captured, Origin};
pub use source::{FsSourceLoader, SourceLoader};
pub use transform::{Markers, SnippetTransformer, Transformed};
