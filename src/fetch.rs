//! Page retrieval over HTTP.
//!
//! The pipeline talks to the network only through the [`PageFetcher`] trait,
//! so listing adapters and the enricher can be exercised against canned
//! pages. [`HttpFetcher`] is the production implementation: one shared
//! `reqwest` client carrying the configured header set, a per-request
//! timeout, and no retries.

use crate::config::{ConfigError, Settings};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Trait for async page retrieval.
///
/// Implementors return the page body decoded as UTF-8. Any non-success
/// outcome, including timeouts and HTTP error statuses, is a [`FetchError`].
pub trait PageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// `reqwest`-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client sending `settings.headers` with every request.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let header_error = || ConfigError::Header { name: name.clone() };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| header_error())?;
            let value = HeaderValue::from_str(value).map_err(|_| header_error())?;
            headers.insert(name, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let res = async {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            response.bytes().await
        }
        .await;
        let dt = t0.elapsed();

        match res {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), elapsed_ms = dt.as_millis() as u64, "Fetched page");
                // The sites serve UTF-8 regardless of what their headers claim.
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(e) => {
                let err = classify(url, e);
                warn!(elapsed_ms = dt.as_millis() as u64, error = %err, "Fetch failed");
                Err(err)
            }
        }
    }
}

/// Map a `reqwest` failure onto the timeout/status/transport split.
fn classify(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = source.status() {
        FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source,
        }
    }
}
