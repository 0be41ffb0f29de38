//! Cache construction.
//!
//! Builds every derived index from a flat set of location records:
//!
//! 1. primary records under their code key
//! 2. one normalized [`CityRecord`](crate::domain::CityRecord) per city and state
//! 3. per-state sorted city and county names, plus the sorted state list
//!
//! Loading happens once at startup, before the store is handed to readers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::aggregate::normalize_city;
use crate::dataset::{DatasetError, RecordSource};
use crate::domain::LocationRecord;
use crate::store::keys::{
    STATES_KEY, city_key, city_state, state_cities_key, state_counties_key, zip_key,
};
use crate::store::{CacheStore, CacheValue, StoreError};

/// Errors that abort a load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Dataset could not be read
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Backend failed while the cache was being written
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Counts from a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Records read from the source
    pub records: usize,
    /// Code keys written (primary records)
    pub codes: usize,
    /// City records written
    pub cities: usize,
    /// States indexed
    pub states: usize,
}

/// Result of calling [`CacheBuilder::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The cache was built
    Loaded(LoadSummary),
    /// The cache was already built; nothing was done
    AlreadyLoaded,
}

/// Populates a [`CacheStore`] from location records.
pub struct CacheBuilder<S: ?Sized = dyn CacheStore> {
    store: Arc<S>,
    loaded: Mutex<bool>,
}

impl<S: CacheStore + ?Sized> CacheBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            loaded: Mutex::new(false),
        }
    }

    /// The store being populated.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether a load has completed since the last clear.
    pub async fn is_loaded(&self) -> bool {
        *self.loaded.lock().await
    }

    /// Build the cache from `source` unless it is already built.
    ///
    /// The source is read in full before the store is cleared. If the store
    /// fails part-way the partial cache is cleared again and the error is
    /// returned.
    pub async fn load<R: RecordSource + ?Sized>(
        &self,
        source: &R,
    ) -> Result<LoadOutcome, LoadError> {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            debug!("Cache already loaded, skipping");
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let records = source.read_records()?;
        info!(
            records = records.len(),
            backend = self.store.name(),
            "Building location cache"
        );

        match self.populate(&records).await {
            Ok(summary) => {
                *loaded = true;
                info!(
                    codes = summary.codes,
                    cities = summary.cities,
                    states = summary.states,
                    "Location cache built"
                );
                Ok(LoadOutcome::Loaded(summary))
            }
            Err(e) => {
                warn!(error = %e, "Cache build failed, clearing partial cache");
                if let Err(clear_err) = self.store.clear().await {
                    warn!(error = %clear_err, "Failed to clear partial cache");
                }
                Err(e.into())
            }
        }
    }

    /// Forget any previous load and build again from `source`.
    pub async fn reload<R: RecordSource + ?Sized>(
        &self,
        source: &R,
    ) -> Result<LoadOutcome, LoadError> {
        *self.loaded.lock().await = false;
        self.load(source).await
    }

    /// Empty the cache. It stays empty until the next load.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut loaded = self.loaded.lock().await;
        self.store.clear().await?;
        *loaded = false;
        Ok(())
    }

    async fn populate(&self, records: &[LocationRecord]) -> Result<LoadSummary, StoreError> {
        self.store.clear().await?;

        let mut summary = LoadSummary {
            records: records.len(),
            ..LoadSummary::default()
        };

        // Pass 1: code keys, and group every record by city and state
        let mut groups: BTreeMap<String, Vec<LocationRecord>> = BTreeMap::new();
        for record in records {
            if record.primary {
                self.store
                    .put(&zip_key(record.code), &CacheValue::Location(record.clone()))
                    .await?;
                summary.codes += 1;
            }
            groups
                .entry(city_state(&record.city, &record.state))
                .or_default()
                .push(record.clone());
        }

        // Pass 2: normalized cities, collecting per-state names
        let mut state_cities: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut state_counties: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (group, members) in &groups {
            let Some(city) = normalize_city(members) else {
                warn!(group = %group, "Skipping empty city group");
                continue;
            };

            self.store
                .put(&city_key(&city.city, &city.state), &CacheValue::City(city.clone()))
                .await?;
            summary.cities += 1;

            let state = city.state.trim().to_uppercase();
            state_counties
                .entry(state.clone())
                .or_default()
                .extend(city.county.iter().cloned());
            state_cities.entry(state).or_default().insert(city.city);
        }

        // Pass 3: state indices and the global state list
        for (state, cities) in &state_cities {
            let counties = state_counties.remove(state).unwrap_or_default();
            debug!(
                state = %state,
                cities = cities.len(),
                counties = counties.len(),
                "Indexed state"
            );

            self.store
                .put(
                    &state_cities_key(state),
                    &CacheValue::Names(cities.iter().cloned().collect()),
                )
                .await?;
            self.store
                .put(
                    &state_counties_key(state),
                    &CacheValue::Names(counties.into_iter().collect()),
                )
                .await?;
        }

        let states: Vec<String> = state_cities.into_keys().collect();
        summary.states = states.len();
        self.store.put(STATES_KEY, &CacheValue::Names(states)).await?;

        Ok(summary)
    }
}
