//! In-process cache backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::StoreError;
use super::keys::NAMESPACE;
use super::{CacheStore, CacheValue};

/// Cache backend holding values in a shared map.
///
/// Clones share the same map, so one instance can back both the builder and
/// any number of readers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, CacheValue>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(NAMESPACE));
        debug!(removed = before - entries.len(), "Cleared memory store");
        Ok(())
    }

    async fn put(&self, key: &str, value: &CacheValue) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    fn scan<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String, StoreError>> {
        // Snapshot the matching keys so the lock is not held while callers iterate
        stream::once(async move {
            let entries = self.entries.read().await;
            entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .map(Ok)
                .collect::<Vec<_>>()
        })
        .flat_map(stream::iter)
        .boxed()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
