//! Storage traits and error types
//!
//! This module defines the trait interface for mirror storage backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Refusing to write outside the mirror root: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for mirror storage backends
///
/// Implementations must tolerate concurrent writes to distinct paths; writes
/// to the same path are last-writer-wins.
pub trait Storage: Send + Sync {
    /// Writes `bytes` at `relative` below the storage root
    ///
    /// Missing parent directories are created and an existing file at the
    /// same location is replaced.
    ///
    /// # Returns
    ///
    /// The absolute path of the written file
    fn write(&self, relative: &Path, bytes: &[u8]) -> StorageResult<PathBuf>;

    /// Returns the absolute root directory of the mirror
    fn root(&self) -> &Path;
}
