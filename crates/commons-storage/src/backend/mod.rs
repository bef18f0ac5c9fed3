//! Object backend implementations.

pub mod local;
pub mod s3;

use std::sync::Arc;

use commons_core::config::{StorageConfig, StorageCredentials};
use commons_core::error::AppError;
use commons_core::result::AppResult;
use commons_core::traits::ObjectBackend;

pub use local::LocalBackend;
pub use s3::S3Backend;

/// Build the backend named by `config.backend`.
pub async fn from_config(
    config: &StorageConfig,
    credentials: &StorageCredentials,
) -> AppResult<Arc<dyn ObjectBackend>> {
    match config.backend.as_str() {
        "s3" => Ok(Arc::new(S3Backend::new(&config.s3, credentials).await?)),
        "local" => Ok(Arc::new(LocalBackend::new(&config.local).await?)),
        other => Err(AppError::configuration(format!(
            "Unknown storage backend: '{other}'. Supported: s3, local"
        ))),
    }
}
