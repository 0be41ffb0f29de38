//! Query-string shapes for the HTTP endpoints, and their mapping onto the
//! engine's option structs.

use serde::{Deserialize, Serialize};

use crate::domain::Projection;
use crate::query::{
    CityInfoOptions, CityListOptions, LookupOptions, MultiCodeOptions, ZipFilter,
};

/// `?keys=city,state`
#[derive(Debug, Default, Deserialize)]
pub struct KeysParams {
    /// Comma-separated field names
    pub keys: Option<String>,
}

/// `GET /zips`
#[derive(Debug, Default, Deserialize)]
pub struct ZipSearchParams {
    pub city: Option<String>,
    pub state: Option<String>,
    pub keys: Option<String>,
}

/// `GET /city`
#[derive(Debug, Deserialize)]
pub struct CityParams {
    /// `"City, ST"`
    pub q: String,
    pub keys: Option<String>,
    /// Code spec to intersect with the city's codes
    pub filter: Option<String>,
    /// Return only the city's codes
    #[serde(default)]
    pub zips_only: bool,
}

/// `GET /states/:state/cities`
#[derive(Debug, Default, Deserialize)]
pub struct StateCitiesParams {
    #[serde(default)]
    pub names_only: bool,
    pub keys: Option<String>,
}

/// `GET /zips/cities`
#[derive(Debug, Deserialize)]
pub struct MultiCodeParams {
    /// Code spec, e.g. `78702-78750,78613`
    pub codes: String,
    pub max: Option<usize>,
    #[serde(default)]
    pub grouped: bool,
    #[serde(default)]
    pub names_only: bool,
    pub keys: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

fn projection(keys: Option<&str>) -> Option<Projection> {
    keys.map(Projection::parse_list)
}

impl From<KeysParams> for LookupOptions {
    fn from(p: KeysParams) -> Self {
        LookupOptions {
            keys: projection(p.keys.as_deref()),
        }
    }
}

impl From<&CityParams> for CityInfoOptions {
    fn from(p: &CityParams) -> Self {
        CityInfoOptions {
            keys: projection(p.keys.as_deref()),
            filter: p.filter.clone(),
        }
    }
}

impl From<ZipSearchParams> for ZipFilter {
    fn from(p: ZipSearchParams) -> Self {
        ZipFilter {
            keys: projection(p.keys.as_deref()),
            city: p.city,
            state: p.state,
        }
    }
}

impl From<StateCitiesParams> for CityListOptions {
    fn from(p: StateCitiesParams) -> Self {
        CityListOptions {
            names_only: p.names_only,
            keys: projection(p.keys.as_deref()),
        }
    }
}

impl From<&MultiCodeParams> for MultiCodeOptions {
    fn from(p: &MultiCodeParams) -> Self {
        MultiCodeOptions {
            keys: projection(p.keys.as_deref()),
            names_only: p.names_only,
            grouped: p.grouped,
            max: p.max,
        }
    }
}
