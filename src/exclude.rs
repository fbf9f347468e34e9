//! Exclusion masks for the archive encoder.

use glob::{MatchOptions, Pattern};

use crate::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A set of case-insensitive wildcard masks tested against single names.
///
/// Masks use `*` and `?` (plus `[...]` classes). They are matched against the
/// last path component only: `a.txt` for a file, `a.txt:meta` or `:meta` for
/// a stream, `build` for a directory.
///
/// # Example
///
/// ```
/// use ntfs_streams::ExcludeSet;
///
/// let set = ExcludeSet::parse("*.tmp;Thumbs.db").unwrap();
/// assert!(set.matches("SKIP.TMP"));
/// assert!(set.matches("thumbs.db"));
/// assert!(!set.matches("keep.txt"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// An empty set that matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `mask1;mask2;...`. Empty parts are skipped.
    pub fn parse(masks: &str) -> Result<Self> {
        Self::from_masks(masks.split(';'))
    }

    /// Compiles each mask. Empty masks are skipped.
    pub fn from_masks<I, S>(masks: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = masks
            .into_iter()
            .filter(|m| !m.as_ref().is_empty())
            .map(|m| {
                let mask = m.as_ref();
                Pattern::new(mask).map_err(|e| Error::InvalidPattern {
                    pattern: mask.to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` if any mask matches `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    /// Returns `true` if there are no masks.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The masks as given.
    pub fn masks(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }
}
