//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"plain"`, `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for `application.log`. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            directory: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "plain".to_string()
}
