//! Crawler coordinator - main mirror orchestration logic
//!
//! This module contains the worker loop that coordinates all aspects of a
//! mirror run, including:
//! - Opening the output directory and building the fetcher
//! - Seeding and draining the frontier with one or more workers
//! - Saving fetched bytes and following extracted references
//! - Handling cancellation
//! - Producing the run summary

use crate::config::Config;
use crate::crawler::extractor::{Extracted, Extractor};
use crate::crawler::fetcher::{FetchResult, FetchStatus, PageFetcher};
use crate::crawler::politeness::Throttle;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::crawler::scheduler::{CrawlTarget, NextTarget, Scheduler};
use crate::crawler::{build_fetcher, CancelToken};
use crate::output::{generate_markdown_summary, RunStats, RunSummary};
use crate::state::{FailureKind, SkipReason, TargetKind, TargetState};
use crate::storage::{open_storage, to_local_path, Storage, StorageError};
use crate::url::{normalize, parse_root_url, Rejection, RootHost};
use crate::{MirrorError, Result, UrlError};
use chrono::Utc;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use url::Url;

/// How long an idle worker sleeps before polling the frontier again
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Targets between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Main mirror coordinator
///
/// Owns all state of a single run. Workers share the coordinator by
/// reference; the scheduler and statistics sit behind separate mutexes that
/// are never held across an await point.
pub struct Coordinator {
    config: Config,
    root: Url,
    root_host: RootHost,
    scheduler: Mutex<Scheduler>,
    stats: Mutex<RunStats>,
    fetcher: Box<dyn PageFetcher>,
    storage: Box<dyn Storage>,
    extractor: Extractor,
    retry: RetryPolicy,
    cancel: CancelToken,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The mirror configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Output directory open, fetcher ready, root seeded
    /// * `Err(MirrorError)` - Invalid configuration or root URL, uncreatable
    ///   output directory, or the fetcher could not be built
    pub async fn new(config: Config) -> Result<Self> {
        crate::config::validate(&config)?;

        let storage = open_storage(Path::new(&config.output.directory)).map_err(|e| match e {
            StorageError::Io { path, source } => MirrorError::OutputDirectory { path, source },
            other => MirrorError::Storage(other),
        })?;

        let fetcher = build_fetcher(&config.fetcher).await?;

        Self::with_components(config, fetcher, Box::new(storage))
    }

    /// Creates a coordinator from an already built fetcher and storage
    pub fn with_components(
        config: Config,
        fetcher: Box<dyn PageFetcher>,
        storage: Box<dyn Storage>,
    ) -> Result<Self> {
        let root = parse_root_url(&config.crawler.root_url)?;
        let root_host = RootHost::from_url(&root).ok_or(UrlError::MissingDomain)?;

        let mut scheduler = Scheduler::new(config.crawler.max_depth, config.crawler.max_pages);
        // max-pages >= 1 is validated, so the root is always accepted
        if let Err(reason) = scheduler.seed(root.clone()) {
            tracing::warn!(url = %root, "Root not accepted: {}", reason);
        }

        Ok(Self {
            extractor: Extractor::new(&config.extractor.link_exclusions),
            retry: RetryPolicy::from_config(&config.fetcher),
            root,
            root_host,
            scheduler: Mutex::new(scheduler),
            stats: Mutex::new(RunStats::new()),
            fetcher,
            storage,
            cancel: CancelToken::new(),
            config_hash: None,
            config,
        })
    }

    /// Records the configuration file hash in the summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Returns a token that stops the run when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn output_dir(&self) -> &Path {
        self.storage.root()
    }

    /// Runs the mirror until the frontier drains or the run is cancelled
    ///
    /// This method:
    /// 1. Starts `crawler.workers` workers on the shared frontier
    /// 2. Waits for all of them to finish
    /// 3. Shuts the fetcher down
    /// 4. Writes the markdown report, if configured
    /// 5. Returns the run summary
    pub async fn run(self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let worker_count = self.config.crawler.workers.max(1) as usize;

        tracing::info!(
            root = %self.root,
            workers = worker_count,
            strategy = self.fetcher.name(),
            max_depth = self.config.crawler.max_depth,
            max_pages = self.config.crawler.max_pages,
            "Starting mirror run"
        );

        let workers = (0..worker_count).map(|id| self.worker(id));
        futures::future::join_all(workers).await;

        self.fetcher.shutdown().await;

        let cancelled = self.cancel.is_cancelled();
        let pages_visited = u64::from(self.scheduler().budget().pages_fetched);
        let stats = std::mem::take(&mut *self.stats());

        let summary = RunSummary {
            root_url: self.root.to_string(),
            output_dir: self.storage.root().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            config_hash: self.config_hash.clone(),
            strategy: self.config.fetcher.strategy.as_str().to_string(),
            cancelled,
            pages_visited,
            stats,
        };

        if let Some(path) = &self.config.output.summary_path {
            match generate_markdown_summary(&summary, Path::new(path)) {
                Ok(()) => tracing::info!("Wrote run report to {}", path),
                Err(e) => tracing::warn!("Failed to write run report to {}: {}", path, e),
            }
        }

        tracing::info!(
            "Mirror {}: {} pages visited, {} files saved, {} failures in {:?}",
            summary.status(),
            summary.pages_visited,
            summary.files_saved(),
            summary.total_failures(),
            start_time.elapsed()
        );

        Ok(summary)
    }

    fn scheduler(&self) -> MutexGuard<'_, Scheduler> {
        self.scheduler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stats(&self) -> MutexGuard<'_, RunStats> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn worker(&self, id: usize) {
        let mut throttle =
            Throttle::new(Duration::from_millis(self.config.crawler.politeness_delay_ms));
        tracing::debug!(worker = id, "Worker started");

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(worker = id, "Cancellation requested, stopping worker");
                break;
            }

            let next = self.scheduler().next_target();

            match next {
                NextTarget::Ready(target) => {
                    self.process_target(&target, &mut throttle).await;
                    self.scheduler().complete();
                }
                NextTarget::Skipped(target, reason) => {
                    log_transition(&target.url, TargetState::Accepted, TargetState::Skipped(reason));
                    tracing::debug!(url = %target.url, kind = %target.kind, "Skipped: {}", reason);
                    self.stats().record_skip(reason);
                }
                NextTarget::Wait => tokio::time::sleep(IDLE_POLL_INTERVAL).await,
                NextTarget::Finished => break,
            }
        }

        tracing::debug!(worker = id, "Worker finished");
    }

    /// Fetches a single target and records its outcome
    async fn process_target(&self, target: &CrawlTarget, throttle: &mut Throttle) {
        log_transition(&target.url, TargetState::Accepted, TargetState::Fetching);
        tracing::info!(
            url = %target.url,
            kind = %target.kind,
            depth = target.depth,
            "Fetching"
        );

        let result = fetch_with_retry(
            self.fetcher.as_ref(),
            &target.url,
            target.kind,
            &self.retry,
            throttle,
        )
        .await;

        match result.status {
            FetchStatus::Success => self.save_and_extract(target, &result),
            FetchStatus::TransientFailure => self.fail(
                target,
                FailureKind::FetchFailed,
                format!(
                    "{} after {} attempts",
                    result.error.as_deref().unwrap_or("transient failure"),
                    result.attempts
                ),
            ),
            FetchStatus::TerminalFailure => self.fail(
                target,
                FailureKind::NetworkTerminal,
                result.error.unwrap_or_else(|| "terminal failure".to_string()),
            ),
        }

        self.report_progress();
    }

    fn save_and_extract(&self, target: &CrawlTarget, result: &FetchResult) {
        let body = result.body.as_deref().unwrap_or_default();
        let local_path = to_local_path(&target.url);

        let claim = self.stats().claim_path(&local_path, &target.url);
        if let Err(owner) = claim {
            let skipped = TargetState::Skipped(SkipReason::PathCollision);
            log_transition(&target.url, TargetState::Fetching, skipped);
            tracing::warn!(
                url = %target.url,
                kind = %SkipReason::PathCollision,
                path = %local_path.display(),
                owner = %owner,
                "Not saved: local path already taken"
            );
            self.stats().record_collision(target, &local_path, &owner);
            return;
        }

        match self.storage.write(&local_path, body) {
            Ok(written) => {
                log_transition(&target.url, TargetState::Fetching, TargetState::Saved);
                tracing::info!(
                    url = %target.url,
                    kind = %target.kind,
                    path = %written.display(),
                    bytes = body.len(),
                    "Saved"
                );
                self.stats().record_saved(target, local_path);
            }
            Err(e) => {
                self.fail(target, FailureKind::IoFailure, e.to_string());
                return;
            }
        }

        if target.kind != TargetKind::Page || !result.is_html() {
            return;
        }

        // Relative links resolve against where the page actually lives
        let base = if self.root_host.matches(&result.final_url) {
            &result.final_url
        } else {
            &target.url
        };

        match self.extractor.extract(body) {
            Ok(extracted) => self.enqueue_discovered(target, base, extracted),
            Err(e) => {
                tracing::warn!(
                    url = %target.url,
                    kind = %FailureKind::ParseFailure,
                    "Link extraction failed: {}",
                    e
                );
                self.stats().record_parse_failure();
            }
        }
    }

    /// Normalizes extracted references and offers them to the scheduler
    fn enqueue_discovered(&self, page: &CrawlTarget, base: &Url, extracted: Extracted) {
        let links = extracted
            .links
            .iter()
            .map(|raw| (raw, TargetKind::Page, page.depth.saturating_add(1)));
        let assets = extracted
            .assets
            .iter()
            .map(|raw| (raw, TargetKind::Asset, page.depth));

        let mut candidates = Vec::new();
        let mut skips = Vec::new();

        for (raw, kind, depth) in links.chain(assets) {
            match normalize(raw, base, &self.root_host) {
                Ok(url) => candidates.push(CrawlTarget { url, depth, kind }),
                Err(rejection) => {
                    let reason = match rejection {
                        Rejection::CrossDomain(_) => SkipReason::CrossDomain,
                        _ => SkipReason::Unfetchable,
                    };
                    tracing::debug!(link = raw.as_str(), kind = %kind, "Skipped: {}", rejection);
                    skips.push(reason);
                }
            }
        }

        let mut enqueued = 0;
        {
            let mut scheduler = self.scheduler();
            for target in candidates {
                let url = target.url.clone();
                match scheduler.offer(target) {
                    Ok(()) => {
                        log_transition(&url, TargetState::Discovered, TargetState::Accepted);
                        enqueued += 1;
                    }
                    Err(reason) => {
                        log_transition(&url, TargetState::Discovered, TargetState::Skipped(reason));
                        skips.push(reason);
                    }
                }
            }
        }

        tracing::debug!(
            url = %page.url,
            links = extracted.links.len(),
            assets = extracted.assets.len(),
            enqueued,
            "Processed references"
        );

        let mut stats = self.stats();
        for reason in skips {
            stats.record_skip(reason);
        }
    }

    fn fail(&self, target: &CrawlTarget, failure: FailureKind, detail: String) {
        log_transition(
            &target.url,
            TargetState::Fetching,
            TargetState::FailedTerminal(failure),
        );
        tracing::warn!(url = %target.url, kind = %failure, "Target failed: {}", detail);
        self.stats().record_failed(target, failure, detail);
    }

    fn report_progress(&self) {
        let processed = self.stats().targets_processed();
        if processed == 0 || processed % PROGRESS_INTERVAL != 0 {
            return;
        }

        let scheduler = self.scheduler();
        tracing::info!(
            "Progress: {} targets processed, {} pages fetched, {} in frontier",
            processed,
            scheduler.budget().pages_fetched,
            scheduler.frontier_size()
        );
    }
}

fn log_transition(url: &Url, from: TargetState, to: TargetState) {
    debug_assert!(
        from.can_transition_to(to),
        "invalid transition {} -> {}",
        from,
        to
    );
    tracing::trace!(url = %url, "{} -> {}", from, to);
}

/// Runs a complete mirror operation
///
/// This is the main entry point for mirroring a site:
/// 1. Validate the configuration and root URL
/// 2. Open (or create) the output directory
/// 3. Build the configured fetcher
/// 4. Crawl breadth-first within the depth and page budget
/// 5. Save every page and asset at its mapped local path
/// 6. Return the run summary
///
/// # Arguments
///
/// * `config` - The mirror configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished; per-target failures are in the summary
/// * `Err(MirrorError)` - The run could not start
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::load_config;
/// use sumi_mirror::crawler::mirror;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// let summary = mirror(config).await?;
/// println!("{} files saved", summary.files_saved());
/// # Ok(())
/// # }
/// ```
pub async fn mirror(config: Config) -> Result<RunSummary> {
    Coordinator::new(config).await?.run().await
}
