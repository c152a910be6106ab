//! Source excerpts for documentation pages.
//!
//! Two ways of showing source on a page:
//! - [`excerpt`]: a line range of any file, e.g. lines 8 to the end of a test
//! - [`DrillDoc`]: a drill split into title, description and program body
//!
//! A drill file starts with a title comment, optionally prefixed by a section
//! and `;`, followed by description comments and the program:
//!
//! ```text
//! // Reading files;Read file line by line
//! // Use a scanner to split the input on newlines.
//! package drill
//!
//! func init() { ... }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::transform::SnippetTransformer;

static PACKAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^package\s").expect("invalid package regex"));

/// Inclusive, 1-based line range.
///
/// `from == 0` is the same as `from == 1`; `to == None` runs to the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineSpan {
    /// First line to keep.
    pub from: usize,
    /// Last line to keep.
    pub to: Option<usize>,
}

impl LineSpan {
    /// The whole file.
    pub const ALL: Self = Self { from: 0, to: None };

    /// Lines `from..=to`.
    #[must_use]
    pub fn new(from: usize, to: Option<usize>) -> Self {
        Self { from, to }
    }

    /// Whether the span covers the whole file.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.from <= 1 && self.to.is_none()
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "{}-{to}", self.from),
            None => write!(f, "{}-", self.from),
        }
    }
}

/// Error parsing a [`LineSpan`] or a [`DrillDoc`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExcerptError {
    /// Line range is not `N`, `N-M`, `N-` or `-M`, or ends before it starts.
    #[error("invalid line span: {0}")]
    InvalidSpan(String),
    /// First line of a drill is not a `//` comment.
    #[error("missing title comment on the first line")]
    MissingTitle,
    /// Drill has no `package` line.
    #[error("missing package line")]
    MissingPackage,
}

impl FromStr for LineSpan {
    type Err = ExcerptError;

    /// Parse `"3-4"`, `"7-"`, `"-10"` or `"5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExcerptError::InvalidSpan(s.to_owned());
        let number = |part: &str| part.trim().parse::<usize>().map_err(|_| invalid());

        let span = match s.split_once('-') {
            None => {
                let line = number(s)?;
                Self::new(line, Some(line))
            }
            Some((from, to)) => {
                let from = if from.trim().is_empty() { 0 } else { number(from)? };
                let to = if to.trim().is_empty() { None } else { Some(number(to)?) };
                Self::new(from, to)
            }
        };
        if let Some(to) = span.to
            && to < span.from.max(1)
        {
            return Err(invalid());
        }
        Ok(span)
    }
}

/// Keep the lines of `text` within `span`, each terminated by `\n`.
///
/// Lines past the end of the text are ignored.
#[must_use]
pub fn excerpt(text: &str, span: LineSpan) -> String {
    let skip = span.from.saturating_sub(1);
    let take = span.to.map_or(usize::MAX, |to| to.saturating_sub(skip));
    let mut out = String::new();
    for line in text.lines().skip(skip).take(take) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A drill split into the parts shown on its page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrillDoc {
    /// Section from a `section;title` title comment.
    pub section: Option<String>,
    /// Page title.
    pub title: String,
    /// Description comments without their `//` markers.
    pub description: String,
    /// Program from the `package` line on, with the hook renamed.
    pub body: String,
}

impl DrillDoc {
    /// Split drill source into its documentation parts.
    ///
    /// # Errors
    ///
    /// Returns [`ExcerptError::MissingTitle`] if the first line is not a `//`
    /// comment and [`ExcerptError::MissingPackage`] if there is no `package`
    /// line.
    pub fn parse(source: &str, transformer: &SnippetTransformer) -> Result<Self, ExcerptError> {
        let (first, rest) = source.split_once('\n').unwrap_or((source, ""));
        let heading = first
            .strip_prefix("//")
            .ok_or(ExcerptError::MissingTitle)?
            .trim();
        let (section, title) = match heading.split_once(';') {
            Some((section, title)) => (Some(section.trim().to_owned()), title.trim().to_owned()),
            None => (None, heading.to_owned()),
        };

        let package = PACKAGE_LINE
            .find(rest)
            .ok_or(ExcerptError::MissingPackage)?
            .start();
        let description = rest[..package]
            .lines()
            .map(|line| {
                let line = line.trim_start();
                let line = line.strip_prefix("//").unwrap_or(line);
                line.strip_prefix(' ').unwrap_or(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_owned();

        Ok(Self {
            section,
            title,
            description,
            body: transformer.rename_entry(&rest[package..]),
        })
    }
}
