//! Application state for the web layer.

use std::sync::Arc;

use crate::query::QueryEngine;
use crate::store::CacheStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Read-only queries over the built cache
    pub engine: QueryEngine,
}

impl AppState {
    /// Create a new app state over an already-loaded store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            engine: QueryEngine::new(store),
        }
    }
}
