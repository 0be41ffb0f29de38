//! Read-only queries over a built cache.
//!
//! [`QueryEngine`] answers lookups by code, by city and state, and by state,
//! and resolves multi-code specs such as `"78702-78750,78613"` to the cities
//! that own them. It never writes to the store.

use std::sync::Arc;

use futures::StreamExt;
use tracing::warn;

use crate::domain::{CityRecord, Code, LocationRecord, RecordView};
use crate::ranges::{breakout, combine, intersect_ranges, parse_code_spec};
use crate::store::keys::{
    STATES_KEY, ZIP_PREFIX, city_key, state_cities_key, state_counties_key, zip_key,
};
use crate::store::{CacheStore, CacheValue};

mod error;
mod multi;
mod options;


pub use error::QueryError;
pub use multi::MAX_QUERY_CODES;
pub use options::{
    CityInfoOptions, CityListOptions, CityListing, CityMatches, LookupOptions, MultiCodeOptions,
    ZipFilter,
};

/// Query surface over a [`CacheStore`].
pub struct QueryEngine<S: ?Sized = dyn CacheStore> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for QueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CacheStore + ?Sized> QueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The primary location record for `code`.
    pub async fn location(&self, code: Code) -> Result<Option<LocationRecord>, QueryError> {
        self.read(&zip_key(code), CacheValue::into_location).await
    }

    /// The normalized record for a city and state.
    pub async fn city(&self, city: &str, state: &str) -> Result<Option<CityRecord>, QueryError> {
        self.read(&city_key(city, state), CacheValue::into_city)
            .await
    }

    /// Look up a code, e.g. `"78748"`.
    ///
    /// A well-formed code with no data is `Ok(None)`; a malformed one is
    /// [`QueryError::InvalidCode`].
    pub async fn lookup_by_code(
        &self,
        code: &str,
        options: &LookupOptions,
    ) -> Result<Option<RecordView>, QueryError> {
        let code = Code::parse(code.trim())?;
        let location = self.location(code).await?;
        Ok(location.map(|r| RecordView::from(&r).project(options.keys.as_ref())))
    }

    /// Look up a city by name and state. Both are trimmed and compared
    /// case-insensitively; interior spaces matter.
    pub async fn lookup_by_city_state(
        &self,
        city: &str,
        state: &str,
        options: &LookupOptions,
    ) -> Result<Option<RecordView>, QueryError> {
        require_city_state(city, state)?;
        let record = self.city(city, state).await?;
        Ok(record.map(|r| RecordView::from(&r).project(options.keys.as_ref())))
    }

    /// Look up a city from a single `"City, ST"` string.
    ///
    /// With a `filter` spec, the result's `specified_code_range` holds the
    /// filter's codes that belong to the city.
    pub async fn city_info(
        &self,
        city_state: &str,
        options: &CityInfoOptions,
    ) -> Result<Option<RecordView>, QueryError> {
        let (city, state) = split_city_state(city_state)?;
        require_city_state(city, state)?;
        let filter = options
            .filter
            .as_deref()
            .map(parse_code_spec)
            .transpose()?;

        let Some(record) = self.city(city, state).await? else {
            return Ok(None);
        };

        let mut view = RecordView::from(&record);
        if let Some(filter) = filter {
            view.specified_code_range = Some(intersect_ranges(
                &combine(filter),
                &record.code_range,
            )?);
        }
        Ok(Some(view.project(options.keys.as_ref())))
    }

    /// Every code of a `"City, ST"`, ascending.
    pub async fn city_codes(&self, city_state: &str) -> Result<Option<Vec<Code>>, QueryError> {
        let (city, state) = split_city_state(city_state)?;
        require_city_state(city, state)?;

        let Some(record) = self.city(city, state).await? else {
            return Ok(None);
        };
        Ok(Some(breakout(&record.code_range)?))
    }

    /// Every code record matching the filter, in scan order.
    pub async fn lookup_by_filters(
        &self,
        filter: &ZipFilter,
    ) -> Result<Vec<RecordView>, QueryError> {
        let city = filter.city.as_deref().map(|c| c.trim().to_uppercase());
        let state = filter.state.as_deref().map(|s| s.trim().to_uppercase());

        let mut matches = Vec::new();
        let mut keys = self.store.scan(ZIP_PREFIX);
        while let Some(key) = keys.next().await {
            let key = key?;
            let Some(record) = self.read(&key, CacheValue::into_location).await? else {
                continue;
            };

            let city_ok = city.as_ref().is_none_or(|c| record.city.to_uppercase() == *c);
            let state_ok = state
                .as_ref()
                .is_none_or(|s| record.state.to_uppercase() == *s);
            if city_ok && state_ok {
                matches.push(RecordView::from(&record).project(filter.keys.as_ref()));
            }
        }

        Ok(matches)
    }

    /// All state codes, sorted.
    pub async fn states(&self) -> Result<Vec<String>, QueryError> {
        self.names(STATES_KEY).await
    }

    /// The cities of a state, sorted by name.
    pub async fn cities_in_state(
        &self,
        state: &str,
        options: &CityListOptions,
    ) -> Result<CityListing, QueryError> {
        let names = self.names(&state_cities_key(state)).await?;
        if options.names_only {
            return Ok(CityListing::Names(names));
        }

        let mut records = Vec::with_capacity(names.len());
        for name in &names {
            match self.city(name, state).await? {
                Some(city) => {
                    records.push(RecordView::from(&city).project(options.keys.as_ref()))
                }
                None => warn!(city = %name, state = %state, "State lists a city with no record"),
            }
        }
        Ok(CityListing::Records(records))
    }

    /// The counties of a state, sorted and deduplicated.
    pub async fn counties_in_state(&self, state: &str) -> Result<Vec<String>, QueryError> {
        self.names(&state_counties_key(state)).await
    }

    async fn names(&self, key: &str) -> Result<Vec<String>, QueryError> {
        Ok(self
            .read(key, CacheValue::into_names)
            .await?
            .unwrap_or_default())
    }

    /// Read `key` and unwrap the expected variant. A value of the wrong type
    /// is logged and treated as absent.
    async fn read<T>(
        &self,
        key: &str,
        extract: fn(CacheValue) -> Option<T>,
    ) -> Result<Option<T>, QueryError> {
        let Some(value) = self.store.get(key).await? else {
            return Ok(None);
        };
        let extracted = extract(value);
        if extracted.is_none() {
            warn!(key = %key, "Unexpected value type in cache, treating as absent");
        }
        Ok(extracted)
    }
}

fn require_city_state(city: &str, state: &str) -> Result<(), QueryError> {
    if city.trim().is_empty() || state.trim().is_empty() {
        return Err(QueryError::MalformedQuery(format!(
            "city and state are both required, got {city:?} and {state:?}"
        )));
    }
    Ok(())
}

/// Split `"City, ST"` at its first comma.
fn split_city_state(city_state: &str) -> Result<(&str, &str), QueryError> {
    let (city, state) = city_state.split_once(',').ok_or_else(|| {
        QueryError::MalformedQuery(format!("city/state must include ',': {city_state:?}"))
    })?;

    if state.contains(',') {
        return Err(QueryError::MalformedQuery(format!(
            "too many ',' in city/state: {city_state:?}"
        )));
    }

    Ok((city.trim(), state.trim()))
}
