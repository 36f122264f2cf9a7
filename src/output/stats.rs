//! Per-run crawl statistics
//!
//! The coordinator feeds every terminal outcome into a [`RunStats`]; the run
//! summary and the markdown report are built from it.

use crate::crawler::CrawlTarget;
use crate::state::{FailureKind, SkipReason, TargetKind, TargetState};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Final record of a target that was fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecord {
    pub url: Url,
    pub kind: TargetKind,
    pub depth: u32,

    /// Saved, FailedTerminal, or Skipped after a local path collision
    pub state: TargetState,

    /// Path relative to the mirror root, for saved targets
    pub local_path: Option<PathBuf>,

    /// Failure or collision description
    pub detail: Option<String>,
}

/// Counters and records accumulated during a run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub pages_saved: u64,
    pub assets_saved: u64,

    /// Count of skipped targets by reason
    pub skipped: HashMap<SkipReason, u64>,

    /// Count of failures by kind
    pub failures: HashMap<FailureKind, u64>,

    /// Every fetched target, in completion order
    pub records: Vec<TargetRecord>,

    /// Owner of each local path written so far
    claimed_paths: HashMap<PathBuf, Url>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a local path for `url`
    ///
    /// Returns the URL already owning the path when two URLs map to the same
    /// file, e.g. `/about` and `/about.html`.
    pub fn claim_path(&mut self, path: &Path, url: &Url) -> Result<(), Url> {
        match self.claimed_paths.get(path) {
            Some(owner) if owner != url => Err(owner.clone()),
            Some(_) => Ok(()),
            None => {
                self.claimed_paths.insert(path.to_path_buf(), url.clone());
                Ok(())
            }
        }
    }

    pub fn record_saved(&mut self, target: &CrawlTarget, local_path: PathBuf) {
        match target.kind {
            TargetKind::Page => self.pages_saved += 1,
            TargetKind::Asset => self.assets_saved += 1,
        }

        self.records.push(TargetRecord {
            url: target.url.clone(),
            kind: target.kind,
            depth: target.depth,
            state: TargetState::Saved,
            local_path: Some(local_path),
            detail: None,
        });
    }

    pub fn record_failed(
        &mut self,
        target: &CrawlTarget,
        failure: FailureKind,
        detail: impl Into<String>,
    ) {
        *self.failures.entry(failure).or_insert(0) += 1;

        self.records.push(TargetRecord {
            url: target.url.clone(),
            kind: target.kind,
            depth: target.depth,
            state: TargetState::FailedTerminal(failure),
            local_path: None,
            detail: Some(detail.into()),
        });
    }

    /// Counts a saved page whose links could not be extracted
    ///
    /// The page itself stays saved; only the counter moves.
    pub fn record_parse_failure(&mut self) {
        *self.failures.entry(FailureKind::ParseFailure).or_insert(0) += 1;
    }

    /// Records a fetched target that was not written because `owner`
    /// already saved the same local path
    pub fn record_collision(&mut self, target: &CrawlTarget, local_path: &Path, owner: &Url) {
        self.record_skip(SkipReason::PathCollision);

        self.records.push(TargetRecord {
            url: target.url.clone(),
            kind: target.kind,
            depth: target.depth,
            state: TargetState::Skipped(SkipReason::PathCollision),
            local_path: None,
            detail: Some(format!("{} is already saved from {}", local_path.display(), owner)),
        });
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn files_saved(&self) -> u64 {
        self.pages_saved + self.assets_saved
    }

    pub fn targets_processed(&self) -> usize {
        self.records.len()
    }

    pub fn skip_count(&self, reason: SkipReason) -> u64 {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn failure_count(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Records of targets written to disk
    pub fn saved(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records.iter().filter(|r| r.state.is_success())
    }

    /// Records of targets that ended in a terminal failure
    pub fn failed(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records.iter().filter(|r| r.state.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: &str, kind: TargetKind) -> CrawlTarget {
        let url = Url::parse("https://example.com/").unwrap().join(path).unwrap();
        CrawlTarget {
            url,
            depth: 1,
            kind,
        }
    }

    #[test]
    fn test_counts_by_kind() {
        let mut stats = RunStats::new();

        stats.record_saved(&target("/", TargetKind::Page), PathBuf::from("index.html"));
        stats.record_saved(
            &target("/logo.png", TargetKind::Asset),
            PathBuf::from("logo.png"),
        );
        stats.record_failed(
            &target("/blocked", TargetKind::Page),
            FailureKind::FetchFailed,
            "HTTP 403 Forbidden",
        );
        stats.record_parse_failure();
        stats.record_skip(SkipReason::CrossDomain);
        stats.record_skip(SkipReason::CrossDomain);
        stats.record_skip(SkipReason::DepthExceeded);

        assert_eq!(stats.pages_saved, 1);
        assert_eq!(stats.assets_saved, 1);
        assert_eq!(stats.files_saved(), 2);
        assert_eq!(stats.failure_count(FailureKind::FetchFailed), 1);
        assert_eq!(stats.failure_count(FailureKind::ParseFailure), 1);
        assert_eq!(stats.failure_count(FailureKind::IoFailure), 0);
        assert_eq!(stats.total_failures(), 2);
        assert_eq!(stats.skip_count(SkipReason::CrossDomain), 2);
        assert_eq!(stats.total_skipped(), 3);
        assert_eq!(stats.targets_processed(), 3);
    }

    #[test]
    fn test_saved_and_failed_records() {
        let mut stats = RunStats::new();

        stats.record_saved(&target("/about", TargetKind::Page), PathBuf::from("about.html"));
        stats.record_failed(
            &target("/missing", TargetKind::Page),
            FailureKind::NetworkTerminal,
            "HTTP 404 Not Found",
        );

        let saved: Vec<_> = stats.saved().collect();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].local_path, Some(PathBuf::from("about.html")));
        assert_eq!(saved[0].state, TargetState::Saved);

        let failed: Vec<_> = stats.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].state,
            TargetState::FailedTerminal(FailureKind::NetworkTerminal)
        );
        assert_eq!(failed[0].detail.as_deref(), Some("HTTP 404 Not Found"));
    }

    #[test]
    fn test_claim_path() {
        let mut stats = RunStats::new();
        let about = Url::parse("https://example.com/about").unwrap();
        let about_html = Url::parse("https://example.com/about.html").unwrap();
        let path = Path::new("about.html");

        assert!(stats.claim_path(path, &about).is_ok());
        assert!(stats.claim_path(path, &about).is_ok());
        assert_eq!(stats.claim_path(path, &about_html), Err(about));
    }

    #[test]
    fn test_collision_is_a_skip_not_a_failure() {
        let mut stats = RunStats::new();
        let owner = Url::parse("https://example.com/about").unwrap();

        stats.record_collision(
            &target("/about.html", TargetKind::Page),
            Path::new("about.html"),
            &owner,
        );

        assert_eq!(stats.skip_count(SkipReason::PathCollision), 1);
        assert_eq!(stats.total_failures(), 0);
        assert_eq!(stats.failed().count(), 0);
        assert_eq!(stats.saved().count(), 0);
        assert_eq!(
            stats.records[0].state,
            TargetState::Skipped(SkipReason::PathCollision)
        );
        assert_eq!(
            stats.records[0].detail.as_deref(),
            Some("about.html is already saved from https://example.com/about")
        );
    }
}
