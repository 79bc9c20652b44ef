//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a browser-like user agent
//! - GET requests returning raw bytes and the declared Content-Type
//! - Optional bounded retries for transient failures
//! - Error classification

use crate::config::Config;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching a single URL
///
/// None of these abort a crawl. The URL is reported and treated as unobtainable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Returns true for failures that may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Status(status) => status.is_server_error(),
            Self::Body(_) | Self::Request(_) => false,
        }
    }

    fn classify(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Raw response body
    pub bytes: Vec<u8>,

    /// Content-Type header value, empty when absent
    pub content_type: String,
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy. Compressed bodies are decoded
/// transparently.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET client shared by the crawl driver and its fetch workers
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(client: Client, max_retries: u32, backoff: Duration) -> Self {
        Self {
            client,
            max_retries,
            backoff,
        }
    }

    /// Builds a fetcher from the crawler and user agent settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent.value, config.timeout())?;
        Ok(Self::new(
            client,
            config.crawler.max_retries,
            Duration::from_millis(config.crawler.retry_backoff_ms),
        ))
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 5xx | Retry up to `max_retries` times |
    /// | Timeout | Retry up to `max_retries` times |
    /// | Connection error | Retry up to `max_retries` times |
    /// | Any other status | Immediate failure |
    ///
    /// The wait before attempt `n` is `n * backoff`.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(url).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} after {} (attempt {} of {})",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                result => return result,
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedResource {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
