//! Shell-glob exclusion for package extraction and extra-file copies.

use super::fs::normalize_path;
use crate::bundler::error::Result;
use glob::{MatchOptions, Pattern};
use std::{collections::BTreeSet, path::Path};

// `*` crosses directory separators, as fnmatch does.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled set of exclude patterns.
///
/// A pattern that does not end in `*` also excludes everything below a
/// directory of that name, so `pkgs/tests` drops `pkgs/tests/test_x.py`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    patterns: Vec<Pattern>,
}

impl ExcludeMatcher {
    /// Compile glob patterns, deduplicating the expanded forms.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expanded = BTreeSet::new();
        for pattern in patterns {
            let pattern = normalize_pattern(pattern.as_ref());
            if !pattern.ends_with('*') {
                let suffix = if pattern.ends_with('/') { "*" } else { "/*" };
                expanded.insert(format!("{pattern}{suffix}"));
            }
            expanded.insert(pattern);
        }

        let patterns = expanded
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether no patterns were given.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of compiled matchers after expansion and deduplication.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if the normalized `path` matches any pattern.
    pub fn is_excluded(&self, path: impl AsRef<Path>) -> bool {
        let path = normalize_path(path);
        self.patterns
            .iter()
            .any(|p| p.matches_with(&path, MATCH_OPTIONS))
    }
}

fn normalize_pattern(pattern: &str) -> String {
    pattern.replace('\\', "/")
}
