//! Storage module for persisting the mirror
//!
//! This module handles everything that touches the output directory:
//! - Mapping normalized URLs to relative local paths
//! - Writing fetched bytes below the mirror root
//! - Creating directories as needed

mod fs;
mod path_map;
mod traits;

pub use fs::FsStorage;
pub use path_map::to_local_path;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates the mirror output directory
///
/// # Arguments
///
/// * `path` - Path to the output directory
///
/// # Returns
///
/// * `Ok(FsStorage)` - Storage rooted at the output directory
/// * `Err(StorageError)` - The directory could not be created
pub fn open_storage(path: &Path) -> StorageResult<FsStorage> {
    FsStorage::new(path)
}
