// src/watch/glob.rs

//! Shell-style glob matching against paths relative to a watched directory.
//!
//! Patterns are matched against the *whole* relative path with forward
//! slashes, never against a basename:
//!
//! - `*` matches any run of characters except `/`
//! - `**` matches zero or more full path segments
//! - `?` and `[...]` classes behave as in a shell
//!
//! So `*.txt` only matches top-level children, while `**/*.txt` matches
//! `c.txt` as well as `a/b/c.txt`.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{Result, WatchreloadError};

/// Matching options shared by every pattern of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobOptions {
    /// Whether wildcards may match a path segment starting with `.`.
    ///
    /// When `false`, a hidden segment is only matched by a pattern that
    /// spells out a dot segment itself (e.g. `.config/*.toml`).
    pub match_hidden: bool,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self { match_hidden: true }
    }
}

/// A single compiled pattern.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    matcher: GlobMatcher,
    names_hidden: bool,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl Pattern {
    /// Compile `pattern` with path-aware wildcard semantics.
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| WatchreloadError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            matcher: glob.compile_matcher(),
            names_hidden: pattern.split('/').any(is_hidden_segment),
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `rel_path` (relative, `/`-separated) matches.
    ///
    /// An empty relative path (the event path *is* the watched directory)
    /// never matches.
    pub fn is_match(&self, rel_path: &str, options: GlobOptions) -> bool {
        if rel_path.is_empty() {
            return false;
        }
        if !options.match_hidden
            && !self.names_hidden
            && rel_path.split('/').any(is_hidden_segment)
        {
            return false;
        }
        self.matcher.is_match(rel_path)
    }
}

/// The union of all patterns registered for one directory.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    options: GlobOptions,
}

impl PatternSet {
    /// Compile every pattern; fails on the first invalid one.
    pub fn new<I, S>(patterns: I, options: GlobOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns, options })
    }

    /// True if any pattern in the set matches `rel_path`.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.is_match(rel_path, self.options))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Does `rel_path` match `pattern` under the default options?
///
/// An invalid pattern matches nothing.
pub fn matches(rel_path: &str, pattern: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.is_match(rel_path, GlobOptions::default()),
        Err(err) => {
            debug!(%pattern, error = %err, "ignoring invalid glob pattern");
            false
        }
    }
}

fn is_hidden_segment(segment: &str) -> bool {
    segment.starts_with('.') && segment != "." && segment != ".."
}
