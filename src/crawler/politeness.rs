//! Per-worker request pacing
//!
//! Every worker owns a [`Throttle`] and waits on it before each request,
//! retries included, so no worker ever sends two requests closer together
//! than the configured politeness delay.

use std::time::{Duration, Instant};

/// Enforces a minimum interval between consecutive requests
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Checks if a request can be made at `now`
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);

        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// Records that a request was made at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.last_request = Some(now);
    }

    /// Sleeps until a request is allowed, then records it
    pub async fn wait(&mut self) {
        if let Some(delay) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Politeness delay: sleeping {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        self.record_request(Instant::now());
    }
}
