//! Query error types.

use crate::domain::InvalidCode;
use crate::ranges::RangeError;
use crate::store::StoreError;

/// Errors returned by query operations.
///
/// Lookups that find nothing are not errors; they return `None` or an
/// empty collection.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// City/state or range input is structurally invalid
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// A code is not exactly 5 digits
    #[error(transparent)]
    InvalidCode(#[from] InvalidCode),

    /// Backend failure, passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RangeError> for QueryError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::InvalidCode(e) => QueryError::InvalidCode(e),
            other => QueryError::MalformedQuery(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Code;

    #[test]
    fn range_errors_map_to_query_kinds() {
        let invalid = Code::parse("100").unwrap_err();
        assert!(matches!(
            QueryError::from(RangeError::InvalidCode(invalid)),
            QueryError::InvalidCode(_)
        ));

        let err = QueryError::from(RangeError::Malformed("1-2-3".into()));
        assert_eq!(
            err.to_string(),
            "malformed query: malformed range segment \"1-2-3\""
        );
    }

    #[test]
    fn store_errors_pass_through() {
        let err = QueryError::from(StoreError::Unavailable {
            message: "timed out".into(),
        });
        assert!(matches!(err, QueryError::Store(ref e) if e.is_unavailable()));
        assert_eq!(err.to_string(), "backend unavailable: timed out");
    }
}
