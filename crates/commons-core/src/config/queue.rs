//! Queue broker configuration.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Redis broker configuration for the mail queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Redis host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Redis port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Redis password.
    #[serde(default)]
    pub password: Option<String>,
    /// Redis logical database.
    #[serde(default)]
    pub db: i64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Prefix for every key the queue writes.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Name of the email job list.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    /// Seconds a delivery may run before the job is reported as stalled.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_seconds: u64,
    /// Seconds a blocking pop waits before polling again.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// Seconds a job handle waits for an outcome, and how long a
    /// published outcome is kept.
    #[serde(default = "default_result_timeout")]
    pub result_timeout_seconds: u64,
}

impl QueueConfig {
    /// Build a `redis://` URL from the individual fields.
    ///
    /// The password is percent-encoded.
    pub fn url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                utf8_percent_encode(password, NON_ALPHANUMERIC),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Full key of the job list.
    pub fn queue_key(&self) -> String {
        format!("{}{}", self.key_prefix, self.queue_name)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: None,
            db: 0,
            connect_timeout_seconds: default_connect_timeout(),
            key_prefix: default_key_prefix(),
            queue_name: default_queue_name(),
            stall_timeout_seconds: default_stall_timeout(),
            poll_timeout_seconds: default_poll_timeout(),
            result_timeout_seconds: default_result_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_connect_timeout() -> u64 {
    20
}

fn default_key_prefix() -> String {
    "commons:".to_string()
}

fn default_queue_name() -> String {
    "email_worker".to_string()
}

fn default_stall_timeout() -> u64 {
    30
}

fn default_poll_timeout() -> u64 {
    1
}

fn default_result_timeout() -> u64 {
    300
}
