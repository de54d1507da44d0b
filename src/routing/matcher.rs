//! Path pattern matching.
//!
//! # Responsibilities
//! - Classify a registered pattern as exact or prefix (trailing `*`)
//! - Match a normalized request path against a pattern
//! - Detect patterns that shadow each other in sort order
//!
//! # Design Decisions
//! - Matching is case-sensitive and byte-wise
//! - Only a trailing `*` is a wildcard; a `*` elsewhere is literal
//! - No regex, so matching stays O(len)

/// Marker that turns a pattern into a prefix pattern.
pub const WILDCARD: char = '*';

/// Remove a single trailing `/`, if present.
pub fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// A registered path pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pattern {
    raw: String,
}

impl Pattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The pattern exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern ends in the wildcard marker.
    pub fn is_prefix(&self) -> bool {
        self.raw.ends_with(WILDCARD)
    }

    /// The literal part of the pattern: the prefix for wildcard patterns,
    /// the slash-stripped path for exact ones.
    pub fn literal(&self) -> &str {
        match self.raw.strip_suffix(WILDCARD) {
            Some(prefix) => prefix,
            None => strip_trailing_slash(&self.raw),
        }
    }

    /// Returns true if the normalized `path` is selected by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        if self.is_prefix() {
            path.starts_with(self.literal())
        } else {
            path == self.literal()
        }
    }

    /// Returns true if this pattern, checked earlier, can take requests that
    /// `later` would otherwise match.
    pub fn shadows(&self, later: &Pattern) -> bool {
        self.is_prefix() && later.literal().starts_with(self.literal())
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
