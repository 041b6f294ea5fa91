//! Directory-backed key-value store.
//!
//! Each key is one file `{dir}/{key}.json` holding the raw value, written
//! atomically under an exclusive lock.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use launchdeck_core::LaunchdeckError;
use launchdeck_core::error::Result;
use launchdeck_core::favorites::KeyValueStore;

use super::atomic_file::{AtomicFile, AtomicFileError};

/// Durable key-value store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// Fails with `StorageUnavailable` when the directory cannot be created
    /// or the path exists but is not a directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            LaunchdeckError::storage_unavailable(format!(
                "Cannot use {} for favorites: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::debug!("Opened key-value store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LaunchdeckError::config(format!(
                "Invalid storage key '{}': use ASCII letters, digits, '-' or '_'",
                key
            )));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{key}.json"))))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file_for(key)?.load()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key)?;
        file.locked(|file| file.save(value))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key)?;
        file.locked(|file| file.delete())?;
        Ok(())
    }
}

impl From<AtomicFileError> for LaunchdeckError {
    fn from(err: AtomicFileError) -> Self {
        match err {
            AtomicFileError::IoError(e)
                if matches!(
                    e.kind(),
                    ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem | ErrorKind::NotADirectory
                ) =>
            {
                LaunchdeckError::storage_unavailable(e.to_string())
            }
            AtomicFileError::IoError(e) => e.into(),
            AtomicFileError::LockError(message) => LaunchdeckError::storage_unavailable(message),
        }
    }
}
