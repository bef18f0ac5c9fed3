//! Temp files written between decoding and upload.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

/// Directory holding staged uploads.
#[derive(Debug, Clone)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Use `path` as the staging directory. Nothing is created yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if it does not exist.
    pub async fn ensure(&self) -> AppResult<()> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }

        debug!(path = %self.path.display(), "Creating staging directory");
        fs::create_dir_all(&self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create staging directory: {}", self.path.display()),
                e,
            )
        })
    }

    /// Write `data` to a uniquely named file in the directory.
    pub async fn stage(&self, data: &[u8]) -> AppResult<StagedFile> {
        let path = self.path.join(format!("{}.tmp", Uuid::new_v4()));
        // Guard first so a partial write is still removed.
        let staged = StagedFile {
            path,
            removed: false,
        };

        fs::write(&staged.path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write staged file: {}", staged.path.display()),
                e,
            )
        })?;

        Ok(staged)
    }
}

/// A staged file, deleted when dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file back.
    pub async fn read(&self) -> AppResult<Bytes> {
        fs::read(&self.path).await.map(Bytes::from).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Unable to read the file from the staging dir: {e}"),
                e,
            )
        })
    }

    /// Delete the file now, reporting failure.
    pub async fn remove(mut self) -> AppResult<()> {
        self.removed = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove staged file: {}", self.path.display()),
                e,
            )),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "Failed to remove staged file: {e}");
            }
        }
    }
}
