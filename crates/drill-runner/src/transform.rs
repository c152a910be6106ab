//! Snippet transformation.
//!
//! Drills are written as library-style snippets: they declare a
//! non-executable package and do their work in an initialization hook, so
//! they can sit in a package next to other drills. To run one on its own the
//! hook becomes the program entry point and the package becomes the
//! executable package:
//!
//! ```text
//! package drill            package main
//! func init() {      =>    func main() {
//! ```
//!
//! This is plain byte substitution, not a parse. The rest of the snippet is
//! left untouched so the staged program matches the excerpt shown on the
//! page line for line.

/// Marker strings rewritten by [`SnippetTransformer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    /// Initialization hook signature in the snippet (e.g. `func init(`).
    pub entry_hook: String,
    /// Entry point signature that replaces the hook (e.g. `func main(`).
    pub entry_point: String,
    /// Package designation in the snippet (e.g. `package drill`).
    pub package_from: String,
    /// Executable package designation (e.g. `package main`).
    pub package_to: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            entry_hook: "func init(".to_owned(),
            entry_point: "func main(".to_owned(),
            package_from: "package drill".to_owned(),
            package_to: "package main".to_owned(),
        }
    }
}

/// Output of [`SnippetTransformer::transform`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformed {
    /// Transformed source.
    pub bytes: Vec<u8>,
    /// Whether the entry hook was found and replaced.
    pub entry_replaced: bool,
    /// Whether the package designation was found and replaced.
    pub package_replaced: bool,
}

/// Rewrites a drill snippet into a runnable program.
#[derive(Clone, Debug, Default)]
pub struct SnippetTransformer {
    markers: Markers,
    strict: bool,
}

impl SnippetTransformer {
    /// Create a lenient transformer for the given markers.
    #[must_use]
    pub fn new(markers: Markers) -> Self {
        Self {
            markers,
            strict: false,
        }
    }

    /// Require both markers to be present.
    ///
    /// The transformer itself never fails; strictness is read by the caller
    /// to decide whether a missing marker aborts the build.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether missing markers should abort the build.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Configured markers.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Replace every occurrence of both markers.
    ///
    /// Input without markers passes through byte for byte.
    #[must_use]
    pub fn transform(&self, source: &[u8]) -> Transformed {
        let m = &self.markers;
        let (bytes, hooks) = replace_all(source, m.entry_hook.as_bytes(), m.entry_point.as_bytes());
        let (bytes, packages) = replace_all(&bytes, m.package_from.as_bytes(), m.package_to.as_bytes());
        Transformed {
            bytes,
            entry_replaced: hooks > 0,
            package_replaced: packages > 0,
        }
    }

    /// First marker that `transformed` lacks, if any.
    #[must_use]
    pub fn missing_marker(&self, transformed: &Transformed) -> Option<&str> {
        if !transformed.package_replaced {
            Some(&self.markers.package_from)
        } else if !transformed.entry_replaced {
            Some(&self.markers.entry_hook)
        } else {
            None
        }
    }

    /// Rename the hook to the entry point, keeping the package line.
    ///
    /// Used for displaying a drill as the reader would run it.
    #[must_use]
    pub fn rename_entry(&self, source: &str) -> String {
        source.replace(&self.markers.entry_hook, &self.markers.entry_point)
    }
}

/// Replace all non-overlapping occurrences of `from`, returning the count.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> (Vec<u8>, usize) {
    if from.is_empty() {
        return (haystack.to_vec(), 0);
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut count = 0;
    let mut rest = haystack;
    while let Some(pos) = rest.windows(from.len()).position(|w| w == from) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
        count += 1;
    }
    out.extend_from_slice(rest);
    (out, count)
}
