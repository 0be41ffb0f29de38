//! Cache storage backends.
//!
//! The builder and query engine only talk to a [`CacheStore`], so the same
//! logic runs against either backend:
//!
//! - [`MemoryStore`]: an in-process map
//! - [`HttpStore`]: a networked key-value store reached over HTTP
//!
//! Keys follow the fixed scheme in [`keys`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::domain::{CityRecord, LocationRecord};

mod error;
mod http;
pub mod keys;
mod memory;

#[cfg(test)]
pub(crate) mod fake_webdis;

pub use error::StoreError;
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;

/// A value stored under one cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheValue {
    Location(LocationRecord),
    City(CityRecord),
    Names(Vec<String>),
}

impl CacheValue {
    pub fn into_location(self) -> Option<LocationRecord> {
        match self {
            CacheValue::Location(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_city(self) -> Option<CityRecord> {
        match self {
            CacheValue::City(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_names(self) -> Option<Vec<String>> {
        match self {
            CacheValue::Names(names) => Some(names),
            _ => None,
        }
    }
}

/// Trait for cache backends.
///
/// # Thread Safety
///
/// Implementations must support concurrent readers. Writes only happen while
/// the cache is being built, which callers serialize.
///
/// # Scan order
///
/// [`scan`](CacheStore::scan) yields each matching key once per call, in no
/// particular order. Callers must not depend on it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Prepare the backend for use.
    async fn init(&self) -> Result<(), StoreError>;

    /// Remove every key under [`keys::NAMESPACE`], leaving other keys alone.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Insert or replace the value under `key`.
    async fn put(&self, key: &str, value: &CacheValue) -> Result<(), StoreError>;

    /// Read the value under `key`; a missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<CacheValue>, StoreError>;

    /// Stream the keys starting with `prefix`.
    fn scan<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String, StoreError>>;

    /// Human-readable backend name, for logging.
    fn name(&self) -> &'static str;
}
