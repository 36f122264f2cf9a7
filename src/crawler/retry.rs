//! Bounded retry with linear backoff
//!
//! Transient failures are retried up to `max_attempts` total attempts,
//! sleeping `attempt * backoff_step` between attempts. Success and terminal
//! failures return immediately.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::{FetchResult, FetchStatus, PageFetcher};
use crate::crawler::politeness::Throttle;
use crate::state::{FailureKind, TargetKind};
use std::time::Duration;
use url::Url;

/// Retry parameters for a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Backoff unit; the wait after attempt `n` is `n * backoff_step`
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_step_ms),
        )
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

/// Fetches a URL, retrying transient failures according to `policy`
///
/// The throttle is honored before every attempt. When all attempts fail
/// transiently, the last attempt's result is returned unchanged apart from
/// its attempt count; callers treat that as an exhausted fetch.
///
/// # Arguments
///
/// * `fetcher` - The fetch strategy
/// * `url` - The URL to fetch
/// * `kind` - Whether the target is a page or an asset
/// * `policy` - Attempt limit and backoff
/// * `throttle` - The calling worker's politeness throttle
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &Url,
    kind: TargetKind,
    policy: &RetryPolicy,
    throttle: &mut Throttle,
) -> FetchResult {
    let mut attempt = 1;

    loop {
        throttle.wait().await;

        let mut result = fetcher.fetch_once(url, kind).await;
        result.attempts = attempt;

        match result.status {
            FetchStatus::Success | FetchStatus::TerminalFailure => return result,
            FetchStatus::TransientFailure if attempt >= policy.max_attempts => {
                tracing::warn!(
                    url = %url,
                    attempts = attempt,
                    "Giving up: {}",
                    result.error.as_deref().unwrap_or("transient failure")
                );
                return result;
            }
            FetchStatus::TransientFailure => {
                let delay = policy.backoff_for(attempt);
                tracing::warn!(
                    url = %url,
                    kind = %FailureKind::NetworkTransient,
                    attempt,
                    max_attempts = policy.max_attempts,
                    "Transient failure ({}), retrying in {:?}",
                    result.error.as_deref().unwrap_or("unknown"),
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
