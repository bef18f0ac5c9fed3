//! The upload pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};

use commons_core::config::{BucketOptions, StorageConfig, StorageCredentials};
use commons_core::error::AppError;
use commons_core::result::AppResult;
use commons_core::traits::{ObjectAcl, ObjectBackend, PutObject};

use crate::backend;
use crate::bucket::{Bucket, BucketRegistry};
use crate::data_uri;
use crate::resize::{self, ImageSize};
use crate::staging::StagingDir;

/// One file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Name of a registered bucket.
    pub bucket_name: String,
    /// Object key.
    pub file_name: String,
    /// `data:<type>;base64,<payload>` string.
    pub data: String,
    /// Resize to these dimensions when both are set.
    pub size: Option<ImageSize>,
}

impl UploadRequest {
    /// Request without resizing.
    pub fn new(
        bucket_name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            file_name: file_name.into(),
            data: data.into(),
            size: None,
        }
    }

    /// Resize the image before upload.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some(ImageSize::new(width, height));
        self
    }
}

/// Validates and uploads base64 files into registered buckets.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    buckets: BucketRegistry,
    staging: StagingDir,
    backend: Arc<dyn ObjectBackend>,
}

impl ObjectStore {
    /// Register buckets and bind the store to a backend.
    ///
    /// Fails when credentials are incomplete or any bucket is invalid.
    pub fn initialize(
        buckets: &[BucketOptions],
        credentials: &StorageCredentials,
        staging_dir: impl Into<PathBuf>,
        backend: Arc<dyn ObjectBackend>,
    ) -> AppResult<Self> {
        if !credentials.is_complete() {
            return Err(AppError::configuration(
                "Please specify storage credentials for the uploader. Set as env variables AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
            ));
        }

        let buckets = BucketRegistry::from_options(buckets)?;
        let staging = StagingDir::new(staging_dir);

        info!(
            backend = backend.backend_type(),
            buckets = ?buckets.names().collect::<Vec<_>>(),
            staging = %staging.path().display(),
            "Object store initialized"
        );

        Ok(Self {
            buckets,
            staging,
            backend,
        })
    }

    /// Build the configured backend and register the configured buckets.
    pub async fn from_config(
        config: &StorageConfig,
        credentials: &StorageCredentials,
    ) -> AppResult<Self> {
        let backend = backend::from_config(config, credentials).await?;
        Self::initialize(&config.buckets, credentials, config.staging_dir(), backend)
    }

    /// Registered buckets.
    pub fn buckets(&self) -> &BucketRegistry {
        &self.buckets
    }

    /// Staging directory.
    pub fn staging(&self) -> &StagingDir {
        &self.staging
    }

    /// Upload one file and return its public URL.
    pub async fn upload_file(&self, request: &UploadRequest) -> AppResult<String> {
        self.staging.ensure().await?;

        let bucket = self.validate_call(request)?;
        validate_content(bucket, &request.data)?;

        let (content_type, payload) = data_uri::split(&request.data)?;

        let data = data_uri::decode(payload)?;
        info!("File Buffer Size: {}", data.len());

        let data = resize::resize_if_requested(data, request.size).await?;

        self.stage_and_upload(request, content_type, data).await
    }

    fn validate_call(&self, request: &UploadRequest) -> AppResult<&Bucket> {
        if self.buckets.is_empty() {
            return Err(AppError::validation(
                "Please initialize the store with bucket options before uploading",
            ));
        }

        let bucket = self.buckets.get(&request.bucket_name).ok_or_else(|| {
            AppError::validation(
                "No such Bucket exists with that name please add it during initialization!",
            )
        })?;

        if request.file_name.is_empty() || request.data.is_empty() {
            return Err(AppError::validation(
                "Please specify all options (bucketName, fileName, data)",
            ));
        }

        if let Some(size) = request.size.filter(ImageSize::is_set) {
            size.check_limit()?;
        }

        Ok(bucket)
    }

    async fn stage_and_upload(
        &self,
        request: &UploadRequest,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<String> {
        let staged = self.staging.stage(&data).await?;
        drop(data);

        let body = staged.read().await?;
        let url = self
            .backend
            .put_object(PutObject {
                bucket: request.bucket_name.clone(),
                key: request.file_name.clone(),
                content_type: content_type.to_string(),
                acl: ObjectAcl::PublicRead,
                body,
            })
            .await?;

        info!(
            "Successfully uploaded file. Bucket: {}, Key: {}",
            request.bucket_name, request.file_name
        );
        info!("Public File URL: {url}");

        if let Err(e) = staged.remove().await {
            error!("{e}");
        }

        Ok(url)
    }
}

fn validate_content(bucket: &Bucket, data: &str) -> AppResult<()> {
    let allowed = data_uri::declared_subtype(data).is_some_and(|subtype| bucket.allows(subtype));
    if !allowed {
        return Err(AppError::validation(
            "This file extension is not supported for this Bucket",
        ));
    }

    if data_uri::estimated_size(data) > bucket.max_size {
        return Err(AppError::validation(format!(
            "Your file should be less than {} bytes",
            bucket.max_size
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use commons_core::error::ErrorKind;

    use super::*;

    /// Records every object and optionally fails.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        objects: Mutex<Vec<PutObject>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectBackend for RecordingBackend {
        fn backend_type(&self) -> &str {
            "recording"
        }

        async fn put_object(&self, object: PutObject) -> AppResult<String> {
            if self.fail {
                return Err(AppError::storage("upload refused"));
            }
            let url = format!("mem://{}/{}", object.bucket, object.key);
            self.objects.lock().unwrap().push(object);
            Ok(url)
        }
    }

    const HELLO_TXT: &str = "data:text/plain;base64,aGVsbG8=";

    fn store(staging: &Path, backend: Arc<RecordingBackend>) -> ObjectStore {
        ObjectStore::initialize(
            &[BucketOptions::new("notes", &["plain"], 1_000)],
            &StorageCredentials::new("id", "secret"),
            staging,
            backend,
        )
        .unwrap()
    }

    fn staged_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_upload_passes_decoded_body_and_content_type() {
        let temp = tempfile::tempdir().unwrap();
        let staging = temp.path().join("tempS3Files");
        let backend = Arc::new(RecordingBackend::default());
        let store = store(&staging, backend.clone());

        let url = store
            .upload_file(&UploadRequest::new("notes", "hello.txt", HELLO_TXT))
            .await
            .unwrap();
        assert_eq!(url, "mem://notes/hello.txt");

        let objects = backend.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].content_type, "text/plain");
        assert_eq!(objects[0].acl, ObjectAcl::PublicRead);
        assert_eq!(objects[0].body, Bytes::from_static(b"hello"));
        assert_eq!(staged_files(&staging), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let err = ObjectStore::initialize(
            &[BucketOptions::new("notes", &["plain"], 1_000)],
            &StorageCredentials::default(),
            "./unused",
            Arc::new(RecordingBackend::default()),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_call_validation_happens_before_any_upload() {
        let temp = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let store = store(temp.path(), backend.clone());

        let cases = [
            UploadRequest::new("unknown", "a.txt", HELLO_TXT),
            UploadRequest::new("notes", "", HELLO_TXT),
            UploadRequest::new("notes", "a.txt", ""),
            UploadRequest::new("notes", "a.png", "data:image/png;base64,aGVsbG8="),
            UploadRequest::new("notes", "a.txt", "data:text/plain;base64,!!!"),
            UploadRequest::new("notes", "a.txt", HELLO_TXT).with_size(100_000, 100_000),
        ];
        for request in &cases {
            let err = store.upload_file(request).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{request:?}");
        }

        assert!(backend.objects.lock().unwrap().is_empty());
        assert_eq!(staged_files(temp.path()), 0);
    }

    #[tokio::test]
    async fn test_size_limit_uses_estimate_over_full_string() {
        let temp = tempfile::tempdir().unwrap();
        let store = ObjectStore::initialize(
            &[BucketOptions::new("notes", &["plain"], 23)],
            &StorageCredentials::new("id", "secret"),
            temp.path(),
            Arc::new(RecordingBackend::default()),
        )
        .unwrap();

        // 31 chars -> ceil(93 / 4) = 24 > 23
        let err = store
            .upload_file(&UploadRequest::new("notes", "a.txt", HELLO_TXT))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Your file should be less than 23 bytes");
    }

    #[tokio::test]
    async fn test_failed_upload_removes_staged_file() {
        let temp = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend {
            fail: true,
            ..RecordingBackend::default()
        });
        let store = store(temp.path(), backend);

        let err = store
            .upload_file(&UploadRequest::new("notes", "a.txt", HELLO_TXT))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(staged_files(temp.path()), 0);
    }
}
