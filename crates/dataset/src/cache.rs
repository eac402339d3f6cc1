use crate::error::DatasetError;
use crate::loader::{Dataset, DatasetLoader, DatasetSource};
use configuration::DataSources;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Modification times of every file a cache entry was built from.
type Fingerprint = Vec<Option<SystemTime>>;

struct CacheEntry {
    dataset: Arc<Dataset>,
    fingerprint: Fingerprint,
}

/// Memoizes loaded datasets per source set.
///
/// An entry is served while the modification time of every source file is
/// unchanged; any change (or a file appearing/disappearing) triggers a reload
/// on the next access. `invalidate` drops everything explicitly.
pub struct DatasetCache {
    source: Box<dyn DatasetSource>,
    entries: HashMap<DataSources, CacheEntry>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(Box::new(DatasetLoader::new()))
    }
}

impl DatasetCache {
    pub fn new(source: Box<dyn DatasetSource>) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached dataset for `sources`, loading it when absent or stale.
    pub fn get_or_load(&mut self, sources: &DataSources) -> Result<Arc<Dataset>, DatasetError> {
        let fingerprint = fingerprint(sources);

        if let Some(entry) = self.entries.get(sources) {
            if entry.fingerprint == fingerprint {
                tracing::debug!(path = %sources.primary.display(), "Dataset cache hit.");
                return Ok(Arc::clone(&entry.dataset));
            }
            tracing::info!(path = %sources.primary.display(), "Source files changed; reloading dataset.");
        } else {
            tracing::debug!(path = %sources.primary.display(), "Dataset cache miss.");
        }

        // A failed load leaves no entry behind, so the next access retries.
        self.entries.remove(sources);
        let dataset = Arc::new(self.source.load(sources)?);
        self.entries.insert(
            sources.clone(),
            CacheEntry {
                dataset: Arc::clone(&dataset),
                fingerprint,
            },
        );
        Ok(dataset)
    }

    /// Drops every cached dataset.
    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            tracing::info!(entries = self.entries.len(), "Dataset cache invalidated.");
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fingerprint(sources: &DataSources) -> Fingerprint {
    sources.paths().into_iter().map(|p| modified(p)).collect()
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Capabilities, SchemaProfile};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl DatasetSource for CountingSource {
        fn load(&self, _sources: &DataSources) -> Result<Dataset, DatasetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Dataset::new(
                SchemaProfile::Commercial,
                Capabilities::default(),
                Vec::new(),
            ))
        }
    }

    fn sources(path: &str) -> DataSources {
        DataSources {
            primary: PathBuf::from(path),
            ..DataSources::default()
        }
    }

    #[test]
    fn repeated_access_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = DatasetCache::new(Box::new(CountingSource { calls: calls.clone() }));

        let a = cache.get_or_load(&sources("in-memory.csv")).unwrap();
        let b = cache.get_or_load(&sources("in-memory.csv")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_load(&sources("other.csv")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = DatasetCache::new(Box::new(CountingSource { calls: calls.clone() }));

        cache.get_or_load(&sources("in-memory.csv")).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());
        cache.get_or_load(&sources("in-memory.csv")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
