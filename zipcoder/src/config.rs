//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::store::HttpStoreConfig;

/// Dataset path variable (required).
pub const DATA_VAR: &str = "ZIPCODER_DATA";
/// Networked store URL; in-memory store when unset.
pub const STORE_URL_VAR: &str = "ZIPCODER_STORE_URL";
/// Networked store request timeout in seconds.
pub const STORE_TIMEOUT_VAR: &str = "ZIPCODER_STORE_TIMEOUT_SECS";
/// Listen address.
pub const BIND_VAR: &str = "ZIPCODER_BIND";

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// JSON dataset to load at startup
    pub data_path: PathBuf,
    /// Networked store settings, if one is configured
    pub store: Option<HttpStoreConfig>,
    pub bind: SocketAddr,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let data_path = get(DATA_VAR)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(DATA_VAR))?;

        let store = match get(STORE_URL_VAR) {
            Some(url) => {
                let mut config = HttpStoreConfig::new(url.trim());
                if let Some(secs) = get(STORE_TIMEOUT_VAR) {
                    let secs = secs.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                        var: STORE_TIMEOUT_VAR,
                        value: secs.clone(),
                        reason: e.to_string(),
                    })?;
                    config = config.with_timeout(secs);
                }
                Some(config)
            }
            None => None,
        };

        let bind = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                var: BIND_VAR,
                value: bind.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            data_path,
            store,
            bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_memory_store() {
        let config = config(&[(DATA_VAR, "/data/zips.json")]).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/zips.json"));
        assert!(config.store.is_none());
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn data_path_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATA_VAR)));

        let err = config(&[(DATA_VAR, "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn store_url_selects_networked_store() {
        let config = config(&[
            (DATA_VAR, "zips.json"),
            (STORE_URL_VAR, "http://127.0.0.1:7379"),
            (STORE_TIMEOUT_VAR, "2"),
            (BIND_VAR, "0.0.0.0:8080"),
        ])
        .unwrap();

        let store = config.store.unwrap();
        assert_eq!(store.base_url, "http://127.0.0.1:7379");
        assert_eq!(store.timeout_secs, 2);
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = config(&[
            (DATA_VAR, "zips.json"),
            (STORE_URL_VAR, "http://127.0.0.1:7379"),
            (STORE_TIMEOUT_VAR, "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: STORE_TIMEOUT_VAR, .. }));

        let err = config(&[(DATA_VAR, "zips.json"), (BIND_VAR, "localhost")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid ZIPCODER_BIND"));
    }
}
