//! Pluggable static resource sources.
//!
//! # Responsibilities
//! - Define the `ResourceSource` seam the resolver consults
//! - Provide a filesystem-rooted source, a closure-backed source and an
//!   in-memory source
//!
//! # Design Decisions
//! - Sources are synchronous and may block; the gateway calls them from the
//!   blocking pool
//! - A miss is `None`; read errors are logged and reported as a miss

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;

/// A provider of static asset bytes by request path.
pub trait ResourceSource: Send + Sync + std::fmt::Debug {
    /// Load the resource at `path` (a normalized request path such as
    /// `/index.html`). Returns `None` if this source has nothing there.
    fn load(&self, path: &str) -> Option<Bytes>;
}

/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto the root, refusing anything that would leave it.
    fn resolve_path(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(resolved)
    }
}

impl ResourceSource for DirectorySource {
    fn load(&self, path: &str) -> Option<Bytes> {
        let file_path = match self.resolve_path(path) {
            Some(p) => p,
            None => {
                tracing::warn!(path = %path, "Rejected asset path outside root");
                return None;
            }
        };

        if !file_path.is_file() {
            return None;
        }

        match std::fs::read(&file_path) {
            Ok(contents) => Some(Bytes::from(contents)),
            Err(e) => {
                tracing::warn!(path = ?file_path, error = %e, "Failed to read asset");
                None
            }
        }
    }
}

/// Serves whatever a closure returns.
pub struct FnSource<F> {
    supplier: F,
}

impl<F> FnSource<F>
where
    F: Fn(&str) -> Option<Bytes> + Send + Sync,
{
    pub fn new(supplier: F) -> Self {
        Self { supplier }
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

impl<F> ResourceSource for FnSource<F>
where
    F: Fn(&str) -> Option<Bytes> + Send + Sync,
{
    fn load(&self, path: &str) -> Option<Bytes> {
        (self.supplier)(path)
    }
}

/// Serves assets held in memory, keyed by request path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Bytes>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the asset at `path`.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> &mut Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with(mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl ResourceSource for MemorySource {
    fn load(&self, path: &str) -> Option<Bytes> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body {}").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.load("/css/site.css").unwrap(), Bytes::from("body {}"));
        assert!(source.load("/css/missing.css").is_none());
    }

    #[test]
    fn test_directory_source_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let source = DirectorySource::new(dir.path());
        assert!(source.load("/sub").is_none());
        assert!(source.load("").is_none());
    }

    #[test]
    fn test_directory_source_rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "nope").unwrap();
        std::fs::create_dir(outer.path().join("public")).unwrap();

        let source = DirectorySource::new(outer.path().join("public"));
        assert!(source.load("/../secret.txt").is_none());
        assert!(source.load("/./../secret.txt").is_none());
    }

    #[test]
    fn test_fn_source() {
        let source = FnSource::new(|path: &str| {
            (path == "/generated.js").then(|| Bytes::from_static(b"console.log(1)"))
        });
        assert!(source.load("/generated.js").is_some());
        assert!(source.load("/other.js").is_none());
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("/index.html", "<html></html>");
        assert_eq!(source.load("/index.html").unwrap(), Bytes::from("<html></html>"));
        assert!(source.load("/index.htm").is_none());
    }
}
