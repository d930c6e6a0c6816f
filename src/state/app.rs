use std::sync::Arc;
use crate::cache::ResponseCache;
use crate::circuit_breaker::CircuitBreaker;
use crate::data::AppData;
use crate::metrics::Metrics;
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Application-wide state container.
/// Everything shared between actions lives here and is passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub data: AppData,
    /// Raw model output, keyed on model + prompt
    pub response_cache: ResponseCache,
    pub metrics: Metrics,
    /// Shared by every call to the generation API
    pub breaker: CircuitBreaker,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        AppState {
            data: AppData::new(store),
            response_cache: ResponseCache::default(),
            metrics: Metrics::new(),
            breaker: CircuitBreaker::default(),
        }
    }

    /// State backed by JSON files in the configured data directory.
    pub fn from_config() -> Self {
        let store = FileStore::from_config();
        tracing::info!(dir = %store.dir().display(), "Using file store");
        Self::new(Arc::new(store))
    }

    /// Throwaway state for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
