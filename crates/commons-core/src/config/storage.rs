//! Object storage configuration and credentials.

use serde::{Deserialize, Serialize};

/// Environment variable holding the storage access key ID.
pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the storage secret access key.
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// Top-level object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Staging directory for temp files. Defaults to `<data_root>/tempS3Files`.
    #[serde(default)]
    pub staging_dir: Option<String>,
    /// Backend to upload to: `"s3"` or `"local"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// S3 backend configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
    /// Local filesystem backend configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// Buckets registered at initialization.
    #[serde(default)]
    pub buckets: Vec<BucketOptions>,
}

impl StorageConfig {
    /// Resolve the staging directory.
    pub fn staging_dir(&self) -> String {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| format!("{}/tempS3Files", self.data_root.trim_end_matches('/')))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            staging_dir: None,
            backend: default_backend(),
            s3: S3StorageConfig::default(),
            local: LocalStorageConfig::default(),
            buckets: Vec::new(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint URL for non-AWS services like MinIO.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Use path-style addressing.
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

/// Local filesystem backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path under which each bucket gets a directory.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Base URL prepended to `<bucket>/<key>` in returned URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Raw bucket options as supplied by callers or configuration.
///
/// Every field is optional here so that a missing field can be reported
/// when the bucket is registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketOptions {
    /// Bucket name.
    #[serde(default)]
    pub name: Option<String>,
    /// Allowed MIME subtypes, e.g. `["png", "jpeg"]`.
    #[serde(default, rename = "allowedExtensions", alias = "allowed_extensions")]
    pub allowed_extensions: Option<Vec<String>>,
    /// Maximum decoded file size in bytes.
    #[serde(default, rename = "maxSize", alias = "max_size")]
    pub max_size: Option<u64>,
}

impl BucketOptions {
    /// Convenience constructor with every field present.
    pub fn new(name: impl Into<String>, allowed_extensions: &[&str], max_size: u64) -> Self {
        Self {
            name: Some(name.into()),
            allowed_extensions: Some(allowed_extensions.iter().map(|s| s.to_string()).collect()),
            max_size: Some(max_size),
        }
    }
}

/// Storage backend credentials read from the environment.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StorageCredentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl StorageCredentials {
    /// Create credentials from explicit values.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Read `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`, defaulting to empty.
    pub fn from_env() -> Self {
        Self {
            access_key_id: std::env::var(ACCESS_KEY_ENV).unwrap_or_default(),
            secret_access_key: std::env::var(SECRET_KEY_ENV).unwrap_or_default(),
        }
    }

    /// Whether both values are present.
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .finish()
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_backend() -> String {
    "s3".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_root() -> String {
    "./data/storage/local".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/files".to_string()
}
