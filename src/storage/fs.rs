use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed mirror storage
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Opens (creating if necessary) the mirror root directory
    ///
    /// # Arguments
    ///
    /// * `root` - The output directory; created with all missing parents
    ///
    /// # Returns
    ///
    /// * `Ok(FsStorage)` - Storage rooted at the absolute form of `root`
    /// * `Err(StorageError)` - The directory could not be created
    pub fn new(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root).map_err(|source| StorageError::Io {
            path: root.display().to_string(),
            source,
        })?;

        let root = fs::canonicalize(root).map_err(|source| StorageError::Io {
            path: root.display().to_string(),
            source,
        })?;

        Ok(Self { root })
    }
}

impl Storage for FsStorage {
    fn write(&self, relative: &Path, bytes: &[u8]) -> StorageResult<PathBuf> {
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(relative.display().to_string()));
        }

        let target = self.root.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        fs::write(&target, bytes).map_err(|source| StorageError::Io {
            path: target.display().to_string(),
            source,
        })?;

        tracing::trace!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
