//! Domain types for the postal code lookup engine.
//!
//! Records are validated on construction: a [`Code`] is always a 5-digit
//! postal code, so code that receives one can trust it without rechecking.

mod code;
mod projection;
mod record;

pub use code::{Code, InvalidCode};
pub use projection::{Field, Projection, RecordView};
pub use record::{CityRecord, LocationRecord, RawLocation, split_counties};
