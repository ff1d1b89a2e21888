//! File-name pattern: a regex applied to the base name, anchored at the start.
//!
//! Matching is prefix-style: `file\d` matches `file1.txt` because the regex only
//! has to match at position 0, not consume the whole name. Directory components
//! never take part in matching.

#![allow(missing_docs)]

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::core::errors::{PurgeError, Result};

/// Compiled base-name matcher.
#[derive(Debug, Clone)]
pub struct NamePattern {
    compiled: Regex,
}

impl NamePattern {
    /// Compile `pattern` as written. Anchoring happens at match time, so inline
    /// flags such as `(?x)` with trailing comments keep their meaning.
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| PurgeError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { compiled })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.compiled.as_str()
    }

    /// Does a match of the pattern start at the beginning of `name`?
    ///
    /// The search is leftmost-first, so if any match starts at offset 0 the
    /// reported match does too.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.compiled.find(name).is_some_and(|m| m.start() == 0)
    }

    /// Match against the final component of `path`. Paths without a file name
    /// (`/`, `..`) never match.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        base_name(path).is_some_and(|name| self.matches_name(&name))
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final path component, lossily decoded.
pub fn base_name(path: &Path) -> Option<Cow<'_, str>> {
    path.file_name().map(|n| n.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_not_full_match() {
        let p = NamePattern::new(r"file\d").unwrap();
        assert!(p.matches_name("file1.txt"));
        assert!(p.matches_name("file9"));
        assert!(!p.matches_name("myfile1.txt"), "must be anchored at start");
        assert!(!p.matches_name("fileX.txt"));
    }

    #[test]
    fn matches_base_name_only() {
        let p = NamePattern::new("logs").unwrap();
        assert!(!p.matches_path(Path::new("/var/logs/app.txt")));
        assert!(p.matches_path(Path::new("/var/data/logs-2024.txt")));
    }

    #[test]
    fn alternation_stays_anchored() {
        let p = NamePattern::new("a|b").unwrap();
        assert!(p.matches_name("apple"));
        assert!(p.matches_name("banana"));
        assert!(!p.matches_name("cab"));
    }

    #[test]
    fn explicit_end_anchor_gives_full_match() {
        let p = NamePattern::new(r"file\d\.txt$").unwrap();
        assert!(p.matches_name("file1.txt"));
        assert!(!p.matches_name("file1.txt.bak"));
    }

    #[test]
    fn malformed_pattern_is_pattern_error() {
        let err = NamePattern::new("file(").unwrap_err();
        assert!(matches!(err, PurgeError::Pattern { .. }));
        assert_eq!(err.code(), "PRG-1002");
    }

    #[test]
    fn unbalanced_group_is_rejected() {
        assert!(NamePattern::new("a)|(b").is_err());
    }

    #[test]
    fn verbose_mode_with_trailing_comment() {
        let p = NamePattern::new("(?x) file \\d  # numbered files").unwrap();
        assert!(p.matches_name("file7.log"));
        assert!(!p.matches_name("my file7.log"));
        assert!(!p.matches_name("xfile7"));
    }

    #[test]
    fn later_match_does_not_count() {
        let p = NamePattern::new(r"\d+").unwrap();
        assert!(p.matches_name("2024-report"));
        assert!(!p.matches_name("report-2024"));
    }

    #[test]
    fn optional_prefix_still_anchored() {
        // Leftmost match starts at 0 even when a longer one exists later.
        let p = NamePattern::new("x*abc").unwrap();
        assert!(p.matches_name("abc-xxabc"));
        assert!(!p.matches_name("-abc"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let p = NamePattern::new("").unwrap();
        assert!(p.matches_name("anything"));
    }

    #[test]
    fn root_path_never_matches() {
        let p = NamePattern::new("").unwrap();
        assert!(!p.matches_path(Path::new("/")));
    }
}
