//! Resolving a set of codes to the cities that own them.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::domain::{CityRecord, RecordView};
use crate::ranges::{combine, intersect_ranges, parse_code_spec};
use crate::store::CacheStore;
use crate::store::keys::city_state;

use super::{CityMatches, MultiCodeOptions, QueryEngine, QueryError};

/// Most codes a single query may expand to.
pub const MAX_QUERY_CODES: usize = 10_000;

/// A city owning at least one of the queried codes.
struct CityGroup {
    city: String,
    state: String,
}

impl<S: CacheStore + ?Sized> QueryEngine<S> {
    /// Resolve a spec like `"78702-78750,78613"` to the cities owning its codes.
    ///
    /// A city is found through the primary record of any requested code. Each
    /// match carries a `specified_code_range`: every requested code in the
    /// city's own range, including codes it holds through non-primary
    /// records. Codes with no data are skipped. With `max`, the scan stops at
    /// the first code that would add one city too many.
    ///
    /// Each code costs one store read, so a spec may expand to at most
    /// [`MAX_QUERY_CODES`] codes.
    pub async fn codes_for_multi_code_query(
        &self,
        spec: &str,
        options: &MultiCodeOptions,
    ) -> Result<CityMatches, QueryError> {
        let codes = parse_code_spec(spec)?;
        if codes.len() > MAX_QUERY_CODES {
            return Err(QueryError::MalformedQuery(format!(
                "code spec covers {} codes, at most {MAX_QUERY_CODES} allowed",
                codes.len()
            )));
        }
        let requested = combine(codes.iter().copied());

        let mut groups: Vec<CityGroup> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for &code in &codes {
            let Some(location) = self.location(code).await? else {
                continue;
            };

            let key = city_state(&location.city, &location.state);
            if seen.contains(&key) {
                continue;
            }
            if options.max.is_some_and(|max| groups.len() >= max) {
                break;
            }
            seen.insert(key);
            groups.push(CityGroup {
                city: location.city,
                state: location.state,
            });
        }

        let mut matches: Vec<(CityRecord, String)> = Vec::with_capacity(groups.len());
        for group in groups {
            let Some(city) = self.city(&group.city, &group.state).await? else {
                warn!(city = %group.city, state = %group.state, "Code refers to a city with no record");
                continue;
            };

            match intersect_ranges(&requested, &city.code_range) {
                Ok(specified) => matches.push((city, specified)),
                Err(e) => warn!(city = %city.city, error = %e, "Stored code range is invalid"),
            }
        }

        Ok(shape(matches, options))
    }
}

/// Arrange matches in the output form the options ask for.
fn shape(mut matches: Vec<(CityRecord, String)>, options: &MultiCodeOptions) -> CityMatches {
    let view = |city: &CityRecord, specified: String| {
        let mut view = RecordView::from(city);
        view.specified_code_range = Some(specified);
        view.project(options.keys.as_ref())
    };

    if options.grouped {
        // Several cities can share a specified range
        if options.names_only {
            let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (city, specified) in matches {
                grouped.entry(specified).or_default().push(city.display_name());
            }
            return CityMatches::GroupedNames(grouped);
        }

        let mut grouped: BTreeMap<String, Vec<RecordView>> = BTreeMap::new();
        for (city, specified) in matches {
            let entry = view(&city, specified.clone());
            grouped.entry(specified).or_default().push(entry);
        }
        return CityMatches::GroupedRecords(grouped);
    }

    matches.sort_by(|(a, _), (b, _)| (&a.city, &a.state).cmp(&(&b.city, &b.state)));

    if options.names_only {
        CityMatches::Names(matches.iter().map(|(city, _)| city.display_name()).collect())
    } else {
        CityMatches::Records(
            matches
                .into_iter()
                .map(|(city, specified)| view(&city, specified))
                .collect(),
        )
    }
}
