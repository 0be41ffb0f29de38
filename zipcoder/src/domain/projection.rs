//! Field projection over records.
//!
//! A [`Projection`] names the fields a caller wants back. It is applied after
//! lookup to produce a [`RecordView`]; the canonical records never change
//! shape. Unknown field names are ignored rather than rejected.

use std::collections::BTreeSet;

use serde::Serialize;

use super::record::{CityRecord, LocationRecord};

/// A field that may appear in a [`RecordView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Code,
    City,
    County,
    State,
    Lat,
    Long,
    Primary,
    CodeRange,
    SpecifiedCodeRange,
}

impl Field {
    /// Look up a field by its serialized name.
    pub fn from_name(name: &str) -> Option<Field> {
        let field = match name.trim() {
            "code" => Field::Code,
            "city" => Field::City,
            "county" => Field::County,
            "state" => Field::State,
            "lat" => Field::Lat,
            "long" => Field::Long,
            "primary" => Field::Primary,
            "code_range" => Field::CodeRange,
            "specified_code_range" => Field::SpecifiedCodeRange,
            _ => return None,
        };
        Some(field)
    }

    /// Serialized name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Code => "code",
            Field::City => "city",
            Field::County => "county",
            Field::State => "state",
            Field::Lat => "lat",
            Field::Long => "long",
            Field::Primary => "primary",
            Field::CodeRange => "code_range",
            Field::SpecifiedCodeRange => "specified_code_range",
        }
    }
}

/// The set of fields a caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: BTreeSet<Field>,
}

impl Projection {
    /// Build a projection from field names, skipping names that match no field.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = names
            .into_iter()
            .filter_map(|n| Field::from_name(n.as_ref()))
            .collect();
        Self { fields }
    }

    /// Parse a comma-separated list such as `"city,state"`.
    pub fn parse_list(list: &str) -> Self {
        Self::from_names(list.split(','))
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const N: usize> From<[Field; N]> for Projection {
    fn from(fields: [Field; N]) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

/// A possibly partial view of a record.
///
/// Fields that were not populated are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified_code_range: Option<String>,
}

impl RecordView {
    /// Keep only the fields in `projection`; `None` keeps everything.
    pub fn project(self, projection: Option<&Projection>) -> Self {
        let Some(p) = projection else {
            return self;
        };

        fn keep<T>(p: &Projection, field: Field, value: Option<T>) -> Option<T> {
            if p.contains(field) { value } else { None }
        }

        RecordView {
            code: keep(p, Field::Code, self.code),
            city: keep(p, Field::City, self.city),
            county: keep(p, Field::County, self.county),
            state: keep(p, Field::State, self.state),
            lat: keep(p, Field::Lat, self.lat),
            long: keep(p, Field::Long, self.long),
            primary: keep(p, Field::Primary, self.primary),
            code_range: keep(p, Field::CodeRange, self.code_range),
            specified_code_range: keep(p, Field::SpecifiedCodeRange, self.specified_code_range),
        }
    }

    /// Fields currently populated, in declaration order.
    pub fn fields(&self) -> Vec<Field> {
        [
            (Field::Code, self.code.is_some()),
            (Field::City, self.city.is_some()),
            (Field::County, self.county.is_some()),
            (Field::State, self.state.is_some()),
            (Field::Lat, self.lat.is_some()),
            (Field::Long, self.long.is_some()),
            (Field::Primary, self.primary.is_some()),
            (Field::CodeRange, self.code_range.is_some()),
            (Field::SpecifiedCodeRange, self.specified_code_range.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

impl From<&LocationRecord> for RecordView {
    fn from(r: &LocationRecord) -> Self {
        RecordView {
            code: Some(r.code.to_string()),
            city: Some(r.city.clone()),
            county: Some(r.county.clone()),
            state: Some(r.state.clone()),
            lat: Some(r.lat),
            long: Some(r.long),
            primary: Some(r.primary),
            ..RecordView::default()
        }
    }
}

impl From<&CityRecord> for RecordView {
    fn from(r: &CityRecord) -> Self {
        RecordView {
            city: Some(r.city.clone()),
            county: Some(r.county.clone()),
            state: Some(r.state.clone()),
            lat: Some(r.lat),
            long: Some(r.long),
            code_range: Some(r.code_range.clone()),
            ..RecordView::default()
        }
    }
}
