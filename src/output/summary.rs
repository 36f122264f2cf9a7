//! End-of-run summary
//!
//! [`RunSummary`] is what [`crate::crawler::Coordinator::run`] returns: run
//! metadata plus the accumulated [`RunStats`].

use crate::output::stats::RunStats;
use crate::state::{FailureKind, SkipReason};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Summary of a completed (or cancelled) mirror run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub root_url: String,

    /// Absolute path of the mirror root
    pub output_dir: PathBuf,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when loaded from disk
    pub config_hash: Option<String>,

    /// Fetch strategy used ("http" or "browser")
    pub strategy: String,

    /// True if the run was stopped by cancellation
    pub cancelled: bool,

    /// Pages that entered fetching, successful or not
    pub pages_visited: u64,

    pub stats: RunStats,
}

impl RunSummary {
    pub fn files_saved(&self) -> u64 {
        self.stats.files_saved()
    }

    pub fn total_failures(&self) -> u64 {
        self.stats.total_failures()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    /// Calculates the percentage of fetched targets that were saved
    pub fn success_rate(&self) -> f64 {
        let processed = self.stats.targets_processed();
        if processed == 0 {
            0.0
        } else {
            (self.stats.files_saved() as f64 / processed as f64) * 100.0
        }
    }

    pub fn status(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    }
}

/// Prints the run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Run:");
    println!("  Root URL: {}", summary.root_url);
    println!("  Status: {}", summary.status());
    println!("  Strategy: {}", summary.strategy);
    println!("  Duration: {} seconds", summary.duration_seconds());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Results:");
    println!("  Pages visited: {}", summary.pages_visited);
    println!(
        "  Files saved: {} ({} pages, {} assets)",
        summary.files_saved(),
        summary.stats.pages_saved,
        summary.stats.assets_saved
    );
    println!("  Output directory: {}", summary.output_dir.display());
    println!();

    if summary.total_failures() > 0 {
        println!("Failures:");
        for kind in FailureKind::all() {
            let count = summary.stats.failure_count(kind);
            if count > 0 {
                println!("  {}: {}", kind, count);
            }
        }
        println!();
    }

    if summary.stats.total_skipped() > 0 {
        println!("Skipped:");
        for reason in SkipReason::all() {
            let count = summary.stats.skip_count(reason);
            if count > 0 {
                println!("  {}: {}", reason, count);
            }
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} targets saved)",
        summary.success_rate(),
        summary.files_saved(),
        summary.stats.targets_processed()
    );
}
