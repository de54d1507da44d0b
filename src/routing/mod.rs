//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Normalized request path
//!     → router.rs (ordered pattern scan)
//!     → matcher.rs (exact / trailing-wildcard match)
//!     → Return: matched handler or None (falls through to static assets)
//!
//! Route registration (at startup):
//!     register(pattern, handler)
//!     → stored in sorted order
//!     → overlaps logged
//!     → frozen behind Arc when serving starts
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: first match in lexicographic pattern order wins

pub mod matcher;
pub mod router;

pub use matcher::{strip_trailing_slash, Pattern};
pub use router::PathRouter;
