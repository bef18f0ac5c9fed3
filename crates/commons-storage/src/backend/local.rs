//! Filesystem object backend for development and tests.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use commons_core::config::LocalStorageConfig;
use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;
use commons_core::traits::{ObjectBackend, PutObject};

/// Stores each bucket as a directory under a root path.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Root directory holding one directory per bucket.
    root: PathBuf,
    /// Base URL of returned object URLs.
    public_base_url: String,
}

impl LocalBackend {
    /// Create a backend, creating the root directory if needed.
    pub async fn new(config: &LocalStorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `<bucket>/<key>` below the root, rejecting keys that would
    /// escape it.
    fn resolve(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(bucket).join(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!(
                "Invalid object path: {bucket}/{key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectBackend for LocalBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn put_object(&self, object: PutObject) -> AppResult<String> {
        let path = self.resolve(&object.bucket, &object.key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&path, &object.body).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {}/{}", object.bucket, object.key),
                e,
            )
        })?;

        debug!(
            bucket = %object.bucket,
            key = %object.key,
            content_type = %object.content_type,
            acl = object.acl.as_str(),
            bytes = object.body.len(),
            "Wrote object"
        );

        Ok(format!(
            "{}/{}/{}",
            self.public_base_url,
            object.bucket,
            object.key.trim_start_matches('/')
        ))
    }
}
