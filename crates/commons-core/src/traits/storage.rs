//! Object storage backend trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Canned access control applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    /// Anyone may read the object.
    PublicRead,
    /// Only the owner may read the object.
    Private,
}

impl ObjectAcl {
    /// Wire representation used by S3-compatible APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicRead => "public-read",
            Self::Private => "private",
        }
    }
}

/// A single object upload.
#[derive(Debug, Clone)]
pub struct PutObject {
    /// Target bucket.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// MIME type stored with the object.
    pub content_type: String,
    /// Access control.
    pub acl: ObjectAcl,
    /// Object contents.
    pub body: Bytes,
}

/// Trait for object storage backends.
///
/// Implemented in `commons-storage` for S3 and the local filesystem.
#[async_trait]
pub trait ObjectBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g. "s3", "local").
    fn backend_type(&self) -> &str;

    /// Upload an object and return its public URL.
    async fn put_object(&self, object: PutObject) -> AppResult<String>;
}
