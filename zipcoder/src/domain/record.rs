//! Location and city records.

use serde::{Deserialize, Serialize};

use super::code::{Code, InvalidCode};

/// One postal code's association with a city.
///
/// A single code may map to several cities; exactly one of those
/// associations is `primary` and is what a direct code lookup returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub code: Code,
    pub city: String,
    /// County names in dataset order.
    pub county: Vec<String>,
    /// Two-letter state code.
    pub state: String,
    pub lat: f64,
    pub long: f64,
    pub primary: bool,
}

/// A city normalized from every location record sharing its city and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    /// Deduplicated county names, in order of first appearance.
    pub county: Vec<String>,
    pub state: String,
    /// Range encoding of every code associated with the city.
    pub code_range: String,
    pub lat: f64,
    pub long: f64,
}

impl CityRecord {
    /// `"City, ST"` display name.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// A record as it appears in the raw dataset.
///
/// Counties arrive as a single comma-joined string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    pub zip: String,
    pub city: String,
    #[serde(default)]
    pub county: String,
    pub state: String,
    pub lat: f64,
    pub long: f64,
    #[serde(default)]
    pub primary: bool,
}

impl TryFrom<RawLocation> for LocationRecord {
    type Error = InvalidCode;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let code = Code::parse(raw.zip.trim())?;
        Ok(LocationRecord {
            code,
            city: raw.city.trim().to_string(),
            county: split_counties(&raw.county),
            state: raw.state.trim().to_string(),
            lat: raw.lat,
            long: raw.long,
            primary: raw.primary,
        })
    }
}

/// Split a comma-joined county string into trimmed, non-empty names.
pub fn split_counties(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
