//! # commons-storage
//!
//! Upload pipeline for base64 data URIs. Buckets are registered once with
//! their allowed subtypes and size limit; each upload is validated,
//! decoded, optionally resized, staged on disk, and handed to an
//! `ObjectBackend` (S3 or the local filesystem).

pub mod backend;
pub mod bucket;
pub mod data_uri;
pub mod resize;
pub mod staging;
pub mod uploader;

pub use backend::{LocalBackend, S3Backend};
pub use bucket::{Bucket, BucketRegistry};
pub use resize::ImageSize;
pub use uploader::{ObjectStore, UploadRequest};
