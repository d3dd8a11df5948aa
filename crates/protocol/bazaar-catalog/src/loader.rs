//! Catalog loading.
//!
//! The catalog is read once per loader and cached, including a failed read:
//! later calls observe the same catalog (or the same error) without touching
//! the source again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bazaar_x402::DiscoveryResource;
use once_cell::sync::{Lazy, OnceCell};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};

/// The discovery listing compiled into the crate.
pub const BUNDLED_FIXTURE: &str = include_str!("../fixtures/x402-endpoints.json");

/// Where a catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The listing compiled into the binary.
    Bundled,
    /// A JSON file on disk.
    File(PathBuf),
}

impl CatalogSource {
    /// File source if a path is given, bundled otherwise.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::File(p.to_path_buf()),
            None => Self::Bundled,
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    items: Vec<DiscoveryResource>,
}

/// An ordered, read-only list of discovery resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    resources: Vec<DiscoveryResource>,
}

impl Catalog {
    /// Build a catalog from already-parsed resources.
    pub fn new(resources: Vec<DiscoveryResource>) -> Self {
        Self { resources }
    }

    /// Parse a `{"items": [...]}` document.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::new(document.items))
    }

    /// All resources in listing order.
    pub fn resources(&self) -> &[DiscoveryResource] {
        &self.resources
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the catalog has no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Loads a catalog from its source at most once.
#[derive(Debug)]
pub struct CatalogLoader {
    source: CatalogSource,
    cell: OnceCell<CatalogResult<Arc<Catalog>>>,
}

impl CatalogLoader {
    /// Create a loader for the given source. Nothing is read yet.
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Load the catalog, reading the source on first use only.
    ///
    /// Concurrent first calls block until the single read finishes.
    pub fn load(&self) -> CatalogResult<Arc<Catalog>> {
        self.cell.get_or_init(|| self.read()).clone()
    }

    /// Whether the source has already been read.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    fn read(&self) -> CatalogResult<Arc<Catalog>> {
        debug!(source = %self.source, "Loading discovery catalog");

        let result = match &self.source {
            CatalogSource::Bundled => Catalog::from_json(BUNDLED_FIXTURE),
            CatalogSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| CatalogError::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                })
                .and_then(|json| Catalog::from_json(&json)),
        };

        match result {
            Ok(catalog) => {
                info!(source = %self.source, resources = catalog.len(), "Discovery catalog loaded");
                Ok(Arc::new(catalog))
            }
            Err(e) => {
                warn!(source = %self.source, error = %e, "Failed to load discovery catalog");
                Err(e)
            }
        }
    }
}

static BUNDLED: Lazy<CatalogLoader> = Lazy::new(|| CatalogLoader::new(CatalogSource::Bundled));

/// The process-wide bundled catalog.
pub fn bundled() -> CatalogResult<Arc<Catalog>> {
    BUNDLED.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Barrier;
    use tempfile::NamedTempFile;

    const SMALL: &str = r#"{"items": [
        {"resource": "https://a.example/weather", "type": "http", "x402Version": 1},
        {"resource": "https://b.example/quotes", "type": "http", "x402Version": 2}
    ]}"#;

    fn write_fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_bundled_fixture_parses() {
        let catalog = Catalog::from_json(BUNDLED_FIXTURE).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog
            .resources()
            .iter()
            .any(|r| r.resource.contains("/weather")));
    }

    #[test]
    fn test_bundled_is_shared() {
        let a = bundled().unwrap();
        let b = bundled().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_load_from_file_preserves_order() {
        let file = write_fixture(SMALL);
        let loader = CatalogLoader::new(CatalogSource::File(file.path().to_path_buf()));
        assert!(!loader.is_loaded());

        let catalog = loader.load().unwrap();
        assert!(loader.is_loaded());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resources()[0].resource, "https://a.example/weather");
        assert_eq!(catalog.resources()[1].x402_version, 2);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CatalogLoader::new(CatalogSource::File(dir.path().join("missing.json")));
        let err = loader.load().unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let file = write_fixture("{\"items\": 42}");
        let loader = CatalogLoader::new(CatalogSource::File(file.path().to_path_buf()));
        assert!(matches!(loader.load(), Err(CatalogError::Parse { .. })));

        let file = write_fixture("{}");
        let loader = CatalogLoader::new(CatalogSource::File(file.path().to_path_buf()));
        assert!(matches!(loader.load(), Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_error_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.json");
        let loader = CatalogLoader::new(CatalogSource::File(path.clone()));
        let first = loader.load().unwrap_err();

        // the file appearing later does not trigger a reload
        std::fs::write(&path, SMALL).unwrap();
        assert_eq!(loader.load().unwrap_err(), first);
    }

    #[test]
    fn test_catalog_is_cached() {
        let file = write_fixture(SMALL);
        let loader = CatalogLoader::new(CatalogSource::File(file.path().to_path_buf()));
        let first = loader.load().unwrap();

        std::fs::write(file.path(), "not json").unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let file = write_fixture(SMALL);
        let loader = Arc::new(CatalogLoader::new(CatalogSource::File(
            file.path().to_path_buf(),
        )));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    loader.load().unwrap()
                })
            })
            .collect();

        let catalogs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for catalog in &catalogs[1..] {
            assert!(Arc::ptr_eq(&catalogs[0], catalog));
        }
    }

    #[test]
    fn test_source_from_path() {
        assert_eq!(CatalogSource::from_path(None), CatalogSource::Bundled);
        assert_eq!(
            CatalogSource::from_path(Some(Path::new("/tmp/x.json"))),
            CatalogSource::File(PathBuf::from("/tmp/x.json"))
        );
        assert_eq!(CatalogSource::Bundled.to_string(), "bundled");
    }
}
