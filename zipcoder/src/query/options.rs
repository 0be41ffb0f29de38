//! Per-operation query options.
//!
//! Every option defaults to "no restriction".

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Projection, RecordView};

/// Options for single-record lookups.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Fields to return; `None` returns all of them.
    pub keys: Option<Projection>,
}

impl LookupOptions {
    pub fn with_keys(keys: Projection) -> Self {
        Self { keys: Some(keys) }
    }
}

/// Options for [`city_info`](super::QueryEngine::city_info).
#[derive(Debug, Clone, Default)]
pub struct CityInfoOptions {
    pub keys: Option<Projection>,
    /// Code spec to intersect with the city's codes, e.g. `"78701-78704,78748"`.
    pub filter: Option<String>,
}

/// Filters for listing code records.
#[derive(Debug, Clone, Default)]
pub struct ZipFilter {
    /// Case-insensitive exact city match.
    pub city: Option<String>,
    /// Case-insensitive exact state match.
    pub state: Option<String>,
    pub keys: Option<Projection>,
}

/// Options for listing the cities of a state.
#[derive(Debug, Clone, Default)]
pub struct CityListOptions {
    /// Return names instead of full city records.
    pub names_only: bool,
    pub keys: Option<Projection>,
}

/// Options for resolving a multi-code spec to cities.
#[derive(Debug, Clone, Default)]
pub struct MultiCodeOptions {
    pub keys: Option<Projection>,
    /// Return `"City, ST"` names instead of records.
    pub names_only: bool,
    /// Key results by specified code range instead of listing them.
    pub grouped: bool,
    /// Stop once this many distinct cities are found.
    pub max: Option<usize>,
}

/// Cities of a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CityListing {
    Names(Vec<String>),
    Records(Vec<RecordView>),
}

impl CityListing {
    pub fn len(&self) -> usize {
        match self {
            CityListing::Names(v) => v.len(),
            CityListing::Records(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cities matched by a multi-code query.
///
/// `len` counts cities, not groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CityMatches {
    /// Records sorted by city name
    Records(Vec<RecordView>),
    /// `"City, ST"` names sorted by city name
    Names(Vec<String>),
    /// Records keyed by specified code range, in the order found
    GroupedRecords(BTreeMap<String, Vec<RecordView>>),
    /// Names keyed by specified code range, in the order found
    GroupedNames(BTreeMap<String, Vec<String>>),
}

impl CityMatches {
    pub fn len(&self) -> usize {
        match self {
            CityMatches::Records(v) => v.len(),
            CityMatches::Names(v) => v.len(),
            CityMatches::GroupedRecords(m) => m.values().map(Vec::len).sum(),
            CityMatches::GroupedNames(m) => m.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
