//! Atomic text file operations.
//!
//! Writes never leave a half-written file behind: content goes to a hidden
//! sibling first, is fsynced, then renamed over the target. Read-modify-write
//! sequences can be serialised across processes with [`AtomicFile::locked`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// Reading, writing or renaming failed.
    IoError(io::Error),
    /// The exclusive lock could not be taken.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<io::Error> for AtomicFileError {
    fn from(e: io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

/// A small text file that is only ever replaced whole.
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file; `None` when it does not exist.
    pub fn load(&self) -> Result<Option<String>, AtomicFileError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the content: write the staging file, fsync, rename.
    pub fn save(&self, content: &str) -> Result<(), AtomicFileError> {
        let staging = self.staging_path()?;
        if let Some(dir) = staging.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = File::create(&staging)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    /// Deletes the file; a missing file is not an error.
    pub fn delete(&self) -> Result<(), AtomicFileError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Runs `f` while holding the exclusive lock of this file.
    pub fn locked<R, F>(&self, f: F) -> Result<R, AtomicFileError>
    where
        F: FnOnce(&Self) -> Result<R, AtomicFileError>,
    {
        let _guard = LockGuard::acquire(self.path.with_extension("lock"))?;
        f(self)
    }

    /// `.{file_name}.tmp` next to the target, so the rename stays on one filesystem.
    fn staging_path(&self) -> Result<PathBuf, AtomicFileError> {
        let name = self.path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} does not name a file", self.path.display()),
            )
        })?;
        Ok(self
            .path
            .with_file_name(format!(".{}.tmp", name.to_string_lossy())))
    }
}

/// Holds an exclusive `fs2` lock on a lock file until dropped.
struct LockGuard {
    path: PathBuf,
    _file: File,
}

impl LockGuard {
    fn acquire(path: PathBuf) -> Result<Self, AtomicFileError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                AtomicFileError::LockError(format!("{}: {}", path.display(), e))
            })?;
        }

        Ok(Self { path, _file: file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // The lock itself is released when the handle closes.
        let _ = fs::remove_file(&self.path);
    }
}
