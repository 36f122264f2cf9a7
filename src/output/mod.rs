//! Output module for run statistics and reports
//!
//! This module handles:
//! - Accumulating per-run statistics
//! - Printing the end-of-run summary
//! - Writing the optional markdown report

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{RunStats, TargetRecord};
pub use summary::{print_summary, RunSummary};

use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
