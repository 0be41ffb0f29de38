//! City normalization.
//!
//! Reduces every location record for one city and state to a single
//! [`CityRecord`].

use crate::domain::{CityRecord, LocationRecord};
use crate::ranges::combine;

/// Normalize the records of one city.
///
/// With a single record its coordinates and code are copied unchanged.
/// Otherwise the coordinates are the midpoint of the primary records'
/// bounding box rounded to 4 decimal places, the code range covers every
/// record, and counties are merged in order of first appearance.
///
/// Returns `None` for an empty group.
pub fn normalize_city(records: &[LocationRecord]) -> Option<CityRecord> {
    let first = records.first()?;

    if records.len() == 1 {
        return Some(CityRecord {
            city: first.city.clone(),
            county: first.county.clone(),
            state: first.state.clone(),
            code_range: first.code.to_string(),
            lat: first.lat,
            long: first.long,
        });
    }

    // Fall back to every record when the city has no primary association
    let mut bounds = Bounds::of(records.iter().filter(|r| r.primary));
    if bounds.is_none() {
        bounds = Bounds::of(records.iter());
    }
    let bounds = bounds?;

    Some(CityRecord {
        city: first.city.clone(),
        county: merge_counties(records),
        state: first.state.clone(),
        code_range: combine(records.iter().map(|r| r.code)),
        lat: round4((bounds.lat_min + bounds.lat_max) / 2.0),
        long: round4((bounds.long_min + bounds.long_max) / 2.0),
    })
}

/// Min/max coordinates over a set of records.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    lat_min: f64,
    lat_max: f64,
    long_min: f64,
    long_max: f64,
}

impl Bounds {
    fn of<'a>(records: impl Iterator<Item = &'a LocationRecord>) -> Option<Bounds> {
        records.fold(None, |acc, r| {
            Some(match acc {
                None => Bounds {
                    lat_min: r.lat,
                    lat_max: r.lat,
                    long_min: r.long,
                    long_max: r.long,
                },
                Some(b) => Bounds {
                    lat_min: b.lat_min.min(r.lat),
                    lat_max: b.lat_max.max(r.lat),
                    long_min: b.long_min.min(r.long),
                    long_max: b.long_max.max(r.long),
                },
            })
        })
    }
}

fn merge_counties(records: &[LocationRecord]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for county in records.iter().flat_map(|r| r.county.iter()) {
        if !merged.contains(county) {
            merged.push(county.clone());
        }
    }
    merged
}

/// Round to 4 decimal places, half away from zero.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
