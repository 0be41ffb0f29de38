//! Cache key namespace.
//!
//! Every key this crate writes starts with [`NAMESPACE`], so clearing the
//! cache never touches unrelated keys in a shared backend.

use crate::domain::Code;

/// Prefix shared by every key.
pub const NAMESPACE: &str = "zipcoder:";

/// Prefix of per-code location keys.
pub const ZIP_PREFIX: &str = "zipcoder:zip:";

/// Prefix of normalized city keys.
pub const CITY_PREFIX: &str = "zipcoder:city:";

/// Key holding the sorted list of state codes.
pub const STATES_KEY: &str = "zipcoder:states";

/// `zipcoder:zip:<code>`
pub fn zip_key(code: Code) -> String {
    format!("{ZIP_PREFIX}{code}")
}

/// `zipcoder:city:<CITY>,<STATE>`, with both parts trimmed and uppercased.
pub fn city_key(city: &str, state: &str) -> String {
    format!("{CITY_PREFIX}{}", city_state(city, state))
}

/// `<CITY>,<STATE>` grouping token used for city keys.
pub fn city_state(city: &str, state: &str) -> String {
    format!("{},{}", city.trim().to_uppercase(), state.trim().to_uppercase())
}

/// `zipcoder:state:cities:<STATE>`
pub fn state_cities_key(state: &str) -> String {
    format!("zipcoder:state:cities:{}", state.trim().to_uppercase())
}

/// `zipcoder:state:counties:<STATE>`
pub fn state_counties_key(state: &str) -> String {
    format!("zipcoder:state:counties:{}", state.trim().to_uppercase())
}
