//! Static asset subsystem.
//!
//! # Data Flow
//! ```text
//! Normalized request path (route miss)
//!     → resolver.rs (sources in priority order)
//!     → source.rs (directory / closure / memory)
//!     → on total miss: retry once with the index path
//!     → mime.rs (content type from extension)
//!     → Return: Asset or None (404)
//! ```

pub mod mime;
pub mod resolver;
pub mod source;

pub use mime::mime_type;
pub use resolver::{Asset, AssetResolver, DEFAULT_INDEX_PATH};
pub use source::{DirectorySource, FnSource, MemorySource, ResourceSource};
