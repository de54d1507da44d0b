//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store registered patterns in sort order
//! - Look up the handler for a normalized request path
//! - Report overlapping registrations
//!
//! # Design Decisions
//! - `BTreeMap` keeps patterns in lexicographic order; the first matching
//!   pattern in that order wins, so an earlier `/a*` takes `/ab`
//! - Built before traffic starts, then shared immutably behind `Arc`
//! - Overlaps are logged, never rejected

use std::collections::BTreeMap;

use crate::routing::matcher::{strip_trailing_slash, Pattern};

/// Ordered table of path patterns.
#[derive(Debug)]
pub struct PathRouter<H> {
    routes: BTreeMap<Pattern, H>,
}

impl<H> PathRouter<H> {
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Insert or replace the handler for `pattern`.
    ///
    /// Returns the handler previously bound to the same pattern, if any.
    pub fn register(&mut self, pattern: impl Into<Pattern>, handler: H) -> Option<H> {
        let pattern = pattern.into();

        for existing in self.routes.keys().filter(|p| **p != pattern) {
            let (earlier, later) = if *existing < pattern {
                (existing, &pattern)
            } else {
                (&pattern, existing)
            };
            if earlier.shadows(later) {
                tracing::warn!(
                    earlier = %earlier,
                    later = %later,
                    "Overlapping route patterns, earlier pattern takes precedence"
                );
            }
        }

        tracing::debug!(pattern = %pattern, "Route registered");
        self.routes.insert(pattern, handler)
    }

    /// Find the first handler, in pattern sort order, whose pattern matches.
    pub fn resolve(&self, path: &str) -> Option<&H> {
        self.resolve_entry(path).map(|(_, handler)| handler)
    }

    /// Like [`resolve`](Self::resolve) but also returns the matched pattern.
    ///
    /// `path` is the raw request path; exactly one trailing slash is
    /// stripped before matching.
    pub fn resolve_entry(&self, path: &str) -> Option<(&Pattern, &H)> {
        let path = strip_trailing_slash(path);
        self.routes.iter().find(|(pattern, _)| pattern.matches(path))
    }

    /// Pairs `(earlier, later)` where `earlier` can take requests meant for `later`.
    pub fn shadowed(&self) -> Vec<(&Pattern, &Pattern)> {
        let patterns: Vec<&Pattern> = self.routes.keys().collect();
        let mut overlaps = Vec::new();
        for (i, earlier) in patterns.iter().enumerate() {
            for later in &patterns[i + 1..] {
                if earlier.shadows(later) {
                    overlaps.push((*earlier, *later));
                }
            }
        }
        overlaps
    }

    /// Registered patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.routes.keys()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for PathRouter<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_trailing_slash() {
        let mut router = PathRouter::new();
        router.register("/status", 1);

        assert_eq!(router.resolve("/status"), Some(&1));
        assert_eq!(router.resolve("/status/"), Some(&1));
        assert_eq!(router.resolve("/statuses"), None);
    }

    #[test]
    fn test_only_one_trailing_slash_stripped() {
        let mut router = PathRouter::new();
        router.register("/status", 1);
        router.register("/api*", 2);

        assert_eq!(router.resolve("/status//"), None);
        assert_eq!(router.resolve("/api//"), Some(&2));
    }

    #[test]
    fn test_wildcard_prefix() {
        let mut router = PathRouter::new();
        router.register("/echo*", "echo");

        assert_eq!(router.resolve("/echo"), Some(&"echo"));
        assert_eq!(router.resolve("/echo/a/b"), Some(&"echo"));
        assert_eq!(router.resolve("/other"), None);
    }

    #[test]
    fn test_sort_order_precedence() {
        let mut router = PathRouter::new();
        router.register("/ab", "exact");
        router.register("/a*", "wildcard");

        // "/a*" sorts before "/ab", so it wins even for the exact path.
        assert_eq!(router.resolve("/ab"), Some(&"wildcard"));
        assert_eq!(router.resolve("/ax"), Some(&"wildcard"));
    }

    #[test]
    fn test_exact_before_later_wildcard() {
        let mut router = PathRouter::new();
        router.register("/api/v1", "exact");
        router.register("/api/v1/*", "wildcard");

        assert_eq!(router.resolve("/api/v1"), Some(&"exact"));
        assert_eq!(router.resolve("/api/v1/users"), Some(&"wildcard"));
    }

    #[test]
    fn test_register_replaces() {
        let mut router = PathRouter::new();
        assert_eq!(router.register("/x", 1), None);
        assert_eq!(router.register("/x", 2), Some(1));
        assert_eq!(router.resolve("/x"), Some(&2));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_shadowed_pairs() {
        let mut router = PathRouter::new();
        router.register("/a*", ());
        router.register("/ab", ());
        router.register("/b", ());

        let overlaps: Vec<(String, String)> = router
            .shadowed()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        assert_eq!(overlaps, vec![("/a*".to_string(), "/ab".to_string())]);
    }

    #[test]
    fn test_patterns_in_order() {
        let mut router = PathRouter::new();
        router.register("/z", ());
        router.register("/a", ());
        router.register("/m*", ());

        let order: Vec<&str> = router.patterns().map(|p| p.as_str()).collect();
        assert_eq!(order, vec!["/a", "/m*", "/z"]);
    }

    #[test]
    fn test_empty_router() {
        let router: PathRouter<()> = PathRouter::default();
        assert!(router.is_empty());
        assert!(router.resolve("/").is_none());
    }
}
