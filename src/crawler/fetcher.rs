//! HTTP fetcher implementation
//!
//! This module handles all single-attempt requests for the crawler, including:
//! - Building HTTP clients with a browser-like header set
//! - GET requests returning raw bytes
//! - Classifying responses as success, transient or terminal failure
//!
//! Retrying lives in [`crate::crawler::retry`]; a fetcher only ever makes one
//! request per call and never returns an error past its boundary.

use crate::config::FetcherConfig;
use crate::state::TargetKind;
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Accept header a desktop browser sends for navigation requests
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Upper bound on the TCP/TLS connect phase
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while setting up a fetcher
///
/// Fetch attempts themselves never fail with this type; they report through
/// [`FetchResult`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid value for header {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Outcome class of a single fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// 2xx response with a body
    Success,
    /// Worth retrying: network errors, HTTP 403, 429 and 5xx
    TransientFailure,
    /// Not worth retrying: other 4xx and anything else unexpected
    TerminalFailure,
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The requested URL
    pub url: Url,

    /// URL after redirects
    pub final_url: Url,

    pub status: FetchStatus,

    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,

    /// Response body; present on success only
    pub body: Option<Vec<u8>>,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Human readable failure description
    pub error: Option<String>,

    /// Number of attempts made, filled in by the retry loop
    pub attempts: u32,
}

impl FetchResult {
    pub fn success(
        url: &Url,
        final_url: Url,
        status_code: Option<u16>,
        body: Vec<u8>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            url: url.clone(),
            final_url,
            status: FetchStatus::Success,
            status_code,
            body: Some(body),
            content_type,
            error: None,
            attempts: 1,
        }
    }

    pub fn transient(url: &Url, status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self::failure(url, FetchStatus::TransientFailure, status_code, error)
    }

    pub fn terminal(url: &Url, status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self::failure(url, FetchStatus::TerminalFailure, status_code, error)
    }

    fn failure(
        url: &Url,
        status: FetchStatus,
        status_code: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.clone(),
            final_url: url.clone(),
            status,
            status_code,
            body: None,
            content_type: None,
            error: Some(error.into()),
            attempts: 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }

    /// Returns true if the body should be parsed as HTML
    ///
    /// A missing Content-Type is treated as HTML, matching how browsers sniff
    /// navigation responses.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("application/xhtml")
            }
            None => true,
        }
    }
}

/// A strategy for retrieving a single URL
///
/// Implementations make exactly one attempt per call and report every
/// failure through the returned [`FetchResult`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Makes one attempt at retrieving `url`
    async fn fetch_once(&self, url: &Url, kind: TargetKind) -> FetchResult;

    /// Releases connections, browser processes and other held resources
    async fn shutdown(&self) {}
}

/// Classifies an HTTP status code
///
/// | Status | Class |
/// |--------|-------|
/// | 2xx | Success |
/// | 403, 429 | Transient (anti-bot / rate limiting) |
/// | 5xx | Transient |
/// | other 4xx | Terminal |
/// | anything else | Terminal |
pub fn classify_status(status: StatusCode) -> FetchStatus {
    if status.is_success() {
        FetchStatus::Success
    } else if status == StatusCode::FORBIDDEN
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        FetchStatus::TransientFailure
    } else {
        FetchStatus::TerminalFailure
    }
}

/// Builds the header set sent with every request
///
/// The mirrored site blocks default client fingerprints, so requests look
/// like a desktop browser navigation.
pub fn browser_headers(config: &FetcherConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|_| FetchError::InvalidHeader {
            name: "user-agent",
            value: config.user_agent.clone(),
        })?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|_| {
            FetchError::InvalidHeader {
                name: "accept-language",
                value: config.accept_language.clone(),
            }
        })?,
    );
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );

    Ok(headers)
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FetchError)` - Invalid header values or client construction failure
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::FetcherConfig;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, FetchError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let client = Client::builder()
        .default_headers(browser_headers(config)?)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Direct HTTP fetch strategy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_once(&self, url: &Url, _kind: TargetKind) -> FetchResult {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return classify_request_error(url, &e),
        };

        let status = response.status();
        let final_url = response.url().clone();

        match classify_status(status) {
            FetchStatus::Success => {}
            FetchStatus::TransientFailure => {
                return FetchResult::transient(
                    url,
                    Some(status.as_u16()),
                    format!("HTTP {}", status),
                );
            }
            FetchStatus::TerminalFailure => {
                return FetchResult::terminal(
                    url,
                    Some(status.as_u16()),
                    format!("HTTP {}", status),
                );
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(body) => FetchResult::success(
                url,
                final_url,
                Some(status.as_u16()),
                body.to_vec(),
                content_type,
            ),
            Err(e) => FetchResult::transient(
                url,
                Some(status.as_u16()),
                format!("Failed to read body: {}", e),
            ),
        }
    }
}

/// Classifies a request that produced no response
fn classify_request_error(url: &Url, error: &reqwest::Error) -> FetchResult {
    if error.is_timeout() {
        FetchResult::transient(url, None, "Request timeout")
    } else if error.is_connect() {
        FetchResult::transient(url, None, format!("Connection failed: {}", error))
    } else if error.is_redirect() {
        FetchResult::terminal(url, None, format!("Redirect error: {}", error))
    } else if error.is_builder() {
        FetchResult::terminal(url, None, format!("Invalid request: {}", error))
    } else {
        FetchResult::transient(url, None, error.to_string())
    }
}
