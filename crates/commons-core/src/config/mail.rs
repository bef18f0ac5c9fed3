//! Email delivery configuration.

use serde::{Deserialize, Serialize};

/// Transactional email API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SendGrid API key.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the delivery API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Field-presence policy applied by `send`: `"legacy"` or `"strict"`.
    #[serde(default = "default_validation")]
    pub validation: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout(),
            validation: default_validation(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_validation() -> String {
    "legacy".to_string()
}
