//! Shared test helpers for integration tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use tempfile::TempDir;

use commons::files::{LocalBackend, ObjectStore};
use commons::workers::{EmailMessage, MailTransport};
use commons::{AppResult, StorageCredentials};
use commons_core::config::{BucketOptions, LocalStorageConfig};

/// Object store over a local backend in a temp directory.
pub struct TestStorage {
    /// Keeps the directory alive.
    _temp: TempDir,
    /// Store under test.
    pub store: ObjectStore,
    /// Root of the local backend.
    pub backend_root: PathBuf,
    /// Staging directory used by the store.
    pub staging: PathBuf,
}

impl TestStorage {
    /// Store with an `images` bucket (png, jpeg, 1 MB) and a `docs` bucket (pdf, 1 KB).
    pub async fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let backend_root = temp.path().join("objects");
        let staging = temp.path().join("tempS3Files");

        let backend = LocalBackend::new(&LocalStorageConfig {
            root_path: backend_root.to_string_lossy().into_owned(),
            public_base_url: "http://files.test".to_string(),
        })
        .await
        .expect("Failed to init local backend");

        let store = ObjectStore::initialize(
            &[
                BucketOptions::new("images", &["png", "jpeg"], 1_000_000),
                BucketOptions::new("docs", &["pdf"], 1_000),
            ],
            &StorageCredentials::new("test-key", "test-secret"),
            &staging,
            Arc::new(backend),
        )
        .expect("Failed to init object store");

        Self {
            _temp: temp,
            store,
            backend_root,
            staging,
        }
    }

    /// Path an object is written to by the local backend.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.backend_root.join(bucket).join(key)
    }

    /// Number of files left in the staging directory.
    pub fn staged_files(&self) -> usize {
        count_files(&self.staging)
    }
}

/// Number of entries in a directory, zero when it does not exist.
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Encode a blank PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

/// Wrap bytes in a data URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Transport that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Delivered messages in order.
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn transport_type(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().expect("lock").push(message.clone());
        Ok(())
    }
}
