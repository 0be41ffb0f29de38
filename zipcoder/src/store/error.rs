//! Cache store error types.

/// Errors raised by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached or timed out
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },

    /// Backend answered with an error status
    #[error("backend error {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend reply did not have the expected shape
    #[error("unexpected backend reply: {message}")]
    Protocol { message: String },

    /// Other HTTP failure
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Stored value could not be encoded or decoded
    #[error("bad value for {key}: {message}")]
    Decode { key: String, message: String },

    /// Backend URL cannot carry command paths
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Whether this is the "backend unavailable" kind.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            StoreError::Unavailable {
                message: err.to_string(),
            }
        } else {
            StoreError::Http(err)
        }
    }
}
