//! Crawler module for fetching and mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - Single-attempt fetch strategies (HTTP, optional headless browser)
//! - Bounded retry with linear backoff and per-worker politeness
//! - HTML reference extraction
//! - Frontier scheduling within the depth and page budget
//! - Overall run coordination

#[cfg(feature = "browser")]
mod browser;
mod cancel;
mod coordinator;
mod extractor;
mod fetcher;
mod politeness;
mod retry;
mod scheduler;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use cancel::CancelToken;
pub use coordinator::{mirror, Coordinator};
pub use extractor::{ExtractError, Extracted, Extractor};
pub use fetcher::{
    browser_headers, build_http_client, classify_status, FetchError, FetchResult, FetchStatus,
    HttpFetcher, PageFetcher,
};
pub use politeness::Throttle;
pub use retry::{fetch_with_retry, RetryPolicy};
pub use scheduler::{CrawlBudget, CrawlTarget, NextTarget, Scheduler};

use crate::config::{FetchStrategy, FetcherConfig};
use crate::Result;

/// Builds the fetcher selected by `config.strategy`
///
/// # Returns
///
/// * `Ok(Box<dyn PageFetcher>)` - Ready to fetch
/// * `Err(MirrorError)` - Client construction or browser launch failed, or
///   the browser strategy was requested in a build without it
pub async fn build_fetcher(config: &FetcherConfig) -> Result<Box<dyn PageFetcher>> {
    match config.strategy {
        FetchStrategy::Http => Ok(Box::new(HttpFetcher::new(config)?)),
        FetchStrategy::Browser => build_browser_fetcher(config).await,
    }
}

#[cfg(feature = "browser")]
async fn build_browser_fetcher(config: &FetcherConfig) -> Result<Box<dyn PageFetcher>> {
    Ok(Box::new(BrowserFetcher::launch(config).await?))
}

#[cfg(not(feature = "browser"))]
async fn build_browser_fetcher(config: &FetcherConfig) -> Result<Box<dyn PageFetcher>> {
    Err(crate::ConfigError::UnsupportedStrategy(config.strategy.as_str().to_string()).into())
}
