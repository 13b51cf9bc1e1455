//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with the configured user agent
//! - The [`Transport`] seam used by both the crawler and the downloader
//! - Classifying transport failures as transient or permanent
//! - Decoding page bodies (UTF-8 with a Latin-1 fallback)

use crate::config::HttpConfig;
use crate::crawler::document::HtmlPage;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What went wrong below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request or body read exceeded its timeout
    Timeout,
    /// Connection could not be established
    Connect,
    /// Connection dropped while reading the body
    Body,
    /// Request failed in flight (reset, protocol error)
    Request,
    /// The request could not be built (malformed URL, bad header)
    Invalid,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Body => "body",
            Self::Request => "request",
            Self::Invalid => "invalid request",
        };
        write!(f, "{}", name)
    }
}

/// A transport-level failure (no HTTP status was received)
#[derive(Debug, Clone, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, TransportErrorKind::Invalid)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else if e.is_builder() || e.is_redirect() {
            TransportErrorKind::Invalid
        } else {
            TransportErrorKind::Request
        };
        Self::new(kind, e.to_string())
    }
}

/// Failure to fetch a catalog page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// Issues GET requests
///
/// The crawler and the downloader only talk to the network through this trait, so
/// tests can substitute scripted responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    ///
    /// Any HTTP status is returned as `Ok`; only failures below HTTP are errors.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use statute_harvest::config::HttpConfig;
/// use statute_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.page_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Decodes a page body as UTF-8, falling back to Latin-1
///
/// Some legacy catalog pages are served as ISO-8859-1 without saying so.
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("Body is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Fetches a page and returns its decoded text
///
/// Non-success statuses and transport failures come back as [`FetchError`]; the
/// caller decides whether that is fatal.
pub async fn fetch_text(
    transport: &dyn Transport,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    tracing::debug!("Fetching page {}", url);

    let response = transport
        .get(url, timeout)
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(decode_body(&response.body))
}

/// Fetches a page and parses it
pub async fn fetch_document(
    transport: &dyn Transport,
    url: &str,
    timeout: Duration,
) -> Result<HtmlPage, FetchError> {
    let body = fetch_text(transport, url, timeout).await?;
    Ok(HtmlPage::parse(&body))
}
