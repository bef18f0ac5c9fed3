//! # commons
//!
//! Shared infrastructure for services: logging, a supervised database
//! connection, an email job queue, a base64 upload pipeline, response
//! envelopes, and small utilities.
//!
//! Each component is an explicit instance. [`Commons::bootstrap`] builds
//! all of them once from an [`AppConfig`]; callers pass the result (or
//! individual parts) by reference.

use std::sync::Arc;

pub use commons_api as api;
pub use commons_core::config::{AppConfig, StorageCredentials};
pub use commons_core::error::{AppError, ErrorKind};
pub use commons_core::result::AppResult;
pub use commons_database as db;
pub use commons_logging as logger;
pub use commons_mail as workers;
pub use commons_storage as files;
pub use commons_utils as utils;

use commons_database::ConnectionManager;
use commons_logging::Logger;
use commons_mail::MailQueue;
use commons_storage::ObjectStore;

/// Every component, built once.
#[derive(Debug, Clone)]
pub struct Commons {
    /// Installed logger.
    pub logger: Logger,
    /// Database connection manager. Not connected until `connect` is called.
    pub db: Arc<ConnectionManager>,
    /// Email job queue with its running worker.
    pub workers: Arc<MailQueue>,
    /// Upload pipeline bound to the configured backend.
    pub files: Arc<ObjectStore>,
}

impl Commons {
    /// Build every component from configuration.
    ///
    /// Storage credentials are read from `AWS_ACCESS_KEY_ID` and
    /// `AWS_SECRET_ACCESS_KEY`. The mail queue connects to Redis before this
    /// returns; the database connects on demand.
    pub async fn bootstrap(config: &AppConfig) -> AppResult<Self> {
        Self::bootstrap_with_credentials(config, &StorageCredentials::from_env()).await
    }

    /// Build every component with explicit storage credentials.
    pub async fn bootstrap_with_credentials(
        config: &AppConfig,
        credentials: &StorageCredentials,
    ) -> AppResult<Self> {
        // ── Step 1: Logger ───────────────────────────────────────────
        let logger = commons_logging::initialize(&config.logging)?;
        tracing::info!("Starting commons v{}", env!("CARGO_PKG_VERSION"));

        // ── Step 2: Database manager ─────────────────────────────────
        let db = Arc::new(ConnectionManager::new(config.database.clone()));

        // ── Step 3: Mail queue ───────────────────────────────────────
        tracing::info!("Initializing mail queue...");
        let workers = Arc::new(MailQueue::initialize(&config.queue, &config.mail).await?);

        // ── Step 4: Object store ─────────────────────────────────────
        tracing::info!(backend = %config.storage.backend, "Initializing object store...");
        let files = Arc::new(ObjectStore::from_config(&config.storage, credentials).await?);

        tracing::info!("Commons initialized");
        Ok(Self {
            logger,
            db,
            workers,
            files,
        })
    }

    /// Stop the mail worker and close the database pool.
    pub async fn shutdown(&self) {
        self.workers.shutdown().await;
        self.db.disconnect().await;
        tracing::info!("Commons shut down");
    }
}
