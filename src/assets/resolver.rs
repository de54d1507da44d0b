//! Static asset resolution with index fallback.

use axum::body::Bytes;

use crate::assets::mime::mime_type;
use crate::assets::source::ResourceSource;

/// Default document served when nothing matches the requested path.
pub const DEFAULT_INDEX_PATH: &str = "/index.html";

/// A resolved static asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub body: Bytes,
    pub mime_type: String,
}

/// Looks up static assets across an ordered list of sources.
#[derive(Debug)]
pub struct AssetResolver {
    sources: Vec<Box<dyn ResourceSource>>,
    index_path: String,
}

impl AssetResolver {
    pub fn new(index_path: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            index_path: index_path.into(),
        }
    }

    /// Append a source. Sources are consulted in the order they were added.
    pub fn push_source(&mut self, source: impl ResourceSource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolve `path`, falling back once to the index document.
    ///
    /// May block on source I/O.
    pub fn resolve(&self, path: &str) -> Option<Asset> {
        if let Some(asset) = self.lookup(path) {
            return Some(asset);
        }

        tracing::debug!(path = %path, index = %self.index_path, "Asset miss, trying index");
        self.lookup(&self.index_path)
    }

    fn lookup(&self, path: &str) -> Option<Asset> {
        self.sources
            .iter()
            .find_map(|source| source.load(path))
            .map(|body| Asset {
                body,
                mime_type: mime_type(path),
            })
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_PATH)
    }
}
