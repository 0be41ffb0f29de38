//! Networked cache backend.
//!
//! Talks to a Redis-compatible store through a Webdis-style HTTP front end,
//! where each command is a URL path (`/GET/<key>`, `/KEYS/<pattern>`, ...)
//! and replies are JSON objects keyed by the command name.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Method, Url};
use tracing::debug;

use super::error::StoreError;
use super::keys::NAMESPACE;
use super::{CacheStore, CacheValue};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of keys per DEL request.
const DEFAULT_DELETE_BATCH: usize = 256;

/// Configuration for the networked store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the HTTP front end, e.g. `http://127.0.0.1:7379`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Keys deleted per request when clearing
    pub delete_batch: usize,
}

impl HttpStoreConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delete_batch: DEFAULT_DELETE_BATCH,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set how many keys each DEL request carries.
    pub fn with_delete_batch(mut self, n: usize) -> Self {
        self.delete_batch = n.max(1);
        self
    }
}

/// Cache backend on a remote key-value store.
///
/// Values are stored as JSON text and parsed back on read.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    base_url: Url,
    delete_batch: usize,
}

impl HttpStore {
    /// Create a new store client. No request is made until [`CacheStore::init`].
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            delete_batch: config.delete_batch.max(1),
        })
    }

    /// Build `<base>/<command>/<arg>/...` with each argument percent-encoded.
    fn command_url(&self, command: &str, args: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(command)
            .extend(args);
        Ok(url)
    }

    /// Run one command and return the reply value stored under its name.
    async fn command(
        &self,
        method: Method,
        command: &str,
        args: &[&str],
        body: Option<String>,
    ) -> Result<serde_json::Value, StoreError> {
        let url = self.command_url(command, args)?;

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let mut reply: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| StoreError::Protocol {
                message: format!("{command}: {e}"),
            })?;

        reply.remove(command).ok_or_else(|| StoreError::Protocol {
            message: format!("{command}: reply has no {command} field"),
        })
    }

    /// All keys starting with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let reply = self.command(Method::GET, "KEYS", &[&pattern], None).await?;
        serde_json::from_value(reply).map_err(|e| StoreError::Protocol {
            message: format!("KEYS: {e}"),
        })
    }
}

/// Escape glob metacharacters so a prefix matches literally.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl CacheStore for HttpStore {
    async fn init(&self) -> Result<(), StoreError> {
        self.command(Method::GET, "PING", &[], None).await?;
        debug!(url = %self.base_url, "Connected to networked store");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let keys = self.keys(NAMESPACE).await?;
        for batch in keys.chunks(self.delete_batch) {
            let args: Vec<&str> = batch.iter().map(String::as_str).collect();
            self.command(Method::GET, "DEL", &args, None).await?;
        }
        debug!(removed = keys.len(), "Cleared networked store");
        Ok(())
    }

    async fn put(&self, key: &str, value: &CacheValue) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|e| StoreError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.command(Method::PUT, "SET", &[key], Some(json)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>, StoreError> {
        let reply = self.command(Method::GET, "GET", &[key], None).await?;
        let text = match reply {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::String(text) => text,
            other => {
                return Err(StoreError::Protocol {
                    message: format!("GET: expected string or null, got {other}"),
                });
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Decode {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn scan<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String, StoreError>> {
        stream::once(self.keys(prefix))
            .flat_map(|reply| {
                let items: Vec<Result<String, StoreError>> = match reply {
                    Ok(keys) => keys.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed()
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
