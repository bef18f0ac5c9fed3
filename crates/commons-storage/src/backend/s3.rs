//! S3-compatible object backend.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use commons_core::config::{S3StorageConfig, StorageCredentials};
use commons_core::error::AppError;
use commons_core::result::AppResult;
use commons_core::traits::{ObjectBackend, PutObject};

/// Characters left as-is in a key segment (RFC 3986 unreserved).
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Uploads objects with `PutObject` using static credentials.
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: S3Client,
    region: String,
    endpoint: Option<String>,
    force_path_style: bool,
}

impl S3Backend {
    /// Build a client for the configured region and optional endpoint.
    pub async fn new(config: &S3StorageConfig, credentials: &StorageCredentials) -> AppResult<Self> {
        if !credentials.is_complete() {
            return Err(AppError::configuration(
                "Storage credentials are missing. Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
            ));
        }

        let credentials = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "commons",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&sdk_config);
        if let Some(endpoint) = config.endpoint.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = S3Client::from_conf(builder.build());

        info!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 backend initialized"
        );

        Ok(Self {
            client,
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
            force_path_style: config.force_path_style,
        })
    }

    /// Public URL of an object.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        object_url(self.endpoint.as_deref(), &self.region, bucket, key)
    }

    /// Whether path-style addressing is forced.
    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }
}

fn object_url(endpoint: Option<&str>, region: &str, bucket: &str, key: &str) -> String {
    let key = encode_key(key.trim_start_matches('/'));
    match endpoint {
        Some(endpoint) => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
    }
}

/// Percent-encode each `/`-separated segment of an object key.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ObjectBackend for S3Backend {
    fn backend_type(&self) -> &str {
        "s3"
    }

    async fn put_object(&self, object: PutObject) -> AppResult<String> {
        self.client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .acl(ObjectCannedAcl::from(object.acl.as_str()))
            .content_type(&object.content_type)
            .body(ByteStream::from(object.body))
            .send()
            .await
            .map_err(|e| {
                let message = format!(
                    "Error Unable to complete fileUpload to s3. {}",
                    DisplayErrorContext(&e)
                );
                tracing::error!("{message}");
                AppError::storage(message)
            })?;

        Ok(self.object_url(&object.bucket, &object.key))
    }
}
