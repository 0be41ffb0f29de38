//! Location record sources.
//!
//! The builder reads all records up front through a [`RecordSource`], so an
//! unreadable dataset fails the load before the cache is touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::{LocationRecord, RawLocation};

/// Errors reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// File could not be read
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not valid dataset JSON
    #[error("failed to parse dataset {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record failed validation
    #[error("invalid record under {group}: {message}")]
    InvalidRecord { group: String, message: String },
}

/// Something that yields the complete set of location records.
pub trait RecordSource {
    fn read_records(&self) -> Result<Vec<LocationRecord>, DatasetError>;
}

impl RecordSource for [LocationRecord] {
    fn read_records(&self) -> Result<Vec<LocationRecord>, DatasetError> {
        Ok(self.to_vec())
    }
}

impl RecordSource for Vec<LocationRecord> {
    fn read_records(&self) -> Result<Vec<LocationRecord>, DatasetError> {
        Ok(self.clone())
    }
}

/// Dataset stored as JSON: an object mapping each code to its records.
///
/// ```json
/// { "78748": [ { "zip": "78748", "city": "Austin", "county": "Travis,Hays",
///                "state": "TX", "lat": 30.26, "long": -97.74, "primary": true } ] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonDataset {
    path: PathBuf,
}

impl JsonDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the dataset file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonDataset {
    fn read_records(&self) -> Result<Vec<LocationRecord>, DatasetError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.clone(),
            source,
        })?;

        let groups: BTreeMap<String, Vec<RawLocation>> =
            serde_json::from_str(&json).map_err(|source| DatasetError::Json {
                path: self.path.clone(),
                source,
            })?;

        decode_groups(groups)
    }
}

/// Convert raw dataset groups to typed records, failing on the first bad one.
pub fn decode_groups(
    groups: BTreeMap<String, Vec<RawLocation>>,
) -> Result<Vec<LocationRecord>, DatasetError> {
    let mut records = Vec::new();
    for (group, raws) in groups {
        for raw in raws {
            let record =
                LocationRecord::try_from(raw).map_err(|e| DatasetError::InvalidRecord {
                    group: group.clone(),
                    message: e.to_string(),
                })?;
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "78613": [
            {"zip": "78613", "city": "Cedar Park", "county": "Williamson", "state": "TX",
             "lat": 30.51, "long": -97.83, "primary": true}
        ],
        "78748": [
            {"zip": "78748", "city": "Austin", "county": "Travis,Williamson,Hays", "state": "TX",
             "lat": 30.26, "long": -97.74, "primary": true},
            {"zip": "78748", "city": "Sunset Valley", "county": "Travis", "state": "TX",
             "lat": 30.23, "long": -97.81, "primary": false}
        ]
    }"#;

    #[test]
    fn reads_json_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zips.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let records = JsonDataset::new(&path).read_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].city, "Cedar Park");
        assert_eq!(records[1].county, ["Travis", "Williamson", "Hays"]);
        assert!(!records[2].primary);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JsonDataset::new("/nonexistent/zips.json")
            .read_records()
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zips.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonDataset::new(&path).read_records().unwrap_err();
        assert!(matches!(err, DatasetError::Json { .. }));
    }

    #[test]
    fn bad_code_is_invalid_record() {
        let mut groups = BTreeMap::new();
        groups.insert(
            "100".to_string(),
            vec![RawLocation {
                zip: "100".to_string(),
                city: "Nowhere".to_string(),
                county: String::new(),
                state: "TX".to_string(),
                lat: 0.0,
                long: 0.0,
                primary: true,
            }],
        );

        let err = decode_groups(groups).unwrap_err();
        assert!(err.to_string().starts_with("invalid record under 100"));
    }

    #[test]
    fn vec_is_a_source() {
        let records: Vec<LocationRecord> = Vec::new();
        assert!(records.read_records().unwrap().is_empty());
    }
}
