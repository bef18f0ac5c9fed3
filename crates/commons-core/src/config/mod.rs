//! Configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate.
//! Each sub-module represents a logical configuration section. Every
//! field has a default so a partial file (or none at all) is valid.

pub mod database;
pub mod logging;
pub mod mail;
pub mod queue;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;
pub use self::queue::QueueConfig;
pub use self::storage::{
    BucketOptions, LocalStorageConfig, S3StorageConfig, StorageConfig, StorageCredentials,
};

use crate::error::AppError;

/// Root configuration.
///
/// Top-level deserialization target for the merged configuration files
/// (`config/default` + environment overlay) and `COMMONS__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Mail queue broker settings.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Email delivery settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `COMMONS`, e.g.
    /// `COMMONS__QUEUE__HOST=redis.internal`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COMMONS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.connect_timeout_seconds, 30);
        assert_eq!(config.queue.connect_timeout_seconds, 20);
        assert_eq!(config.mail.validation, "legacy");
        assert_eq!(config.storage.backend, "s3");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"queue": {"host": "redis.internal", "db": 3}}"#).unwrap();
        assert_eq!(config.queue.host, "redis.internal");
        assert_eq!(config.queue.db, 3);
        assert_eq!(config.queue.port, 6379);
    }
}
