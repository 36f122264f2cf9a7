//! Sumi-Mirror: A polite static site mirror
//!
//! This crate implements a depth- and page-bounded crawler that mirrors a single
//! website into a local directory tree, saving pages and their embedded assets
//! at deterministic local paths.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Mirror operations
///
/// Only conditions that prevent a run from starting surface here. Per-target
/// failures during a crawl are recorded in the run statistics instead.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetcher error: {0}")]
    Fetcher(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Fetch strategy '{0}' is not available in this build")]
    UnsupportedStrategy(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{mirror, CancelToken, Coordinator};
pub use output::RunSummary;
pub use state::{FailureKind, SkipReason, TargetKind, TargetState};
pub use storage::to_local_path;
pub use url::{normalize, parse_root_url, Rejection, RootHost};
