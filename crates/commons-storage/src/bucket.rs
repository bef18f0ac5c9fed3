//! Registered buckets.

use std::collections::{BTreeMap, BTreeSet};

use commons_core::config::BucketOptions;
use commons_core::error::AppError;
use commons_core::result::AppResult;

/// Message returned when bucket options are incomplete.
pub const MISSING_BUCKET_OPTIONS: &str =
    "Please specify all bucket options (name, allowedExtensions, maxSize)";

/// A bucket uploads may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name, also the S3 bucket.
    pub name: String,
    /// MIME subtypes accepted for upload, e.g. `png`.
    pub allowed_extensions: BTreeSet<String>,
    /// Maximum estimated decoded size in bytes.
    pub max_size: u64,
}

impl Bucket {
    /// Whether uploads with this MIME subtype are accepted.
    pub fn allows(&self, subtype: &str) -> bool {
        self.allowed_extensions.contains(subtype)
    }
}

impl TryFrom<&BucketOptions> for Bucket {
    type Error = AppError;

    fn try_from(options: &BucketOptions) -> AppResult<Self> {
        let name = options.name.as_deref().filter(|n| !n.is_empty());
        let extensions = options.allowed_extensions.as_ref().filter(|e| !e.is_empty());
        let max_size = options.max_size.filter(|s| *s > 0);

        match (name, extensions, max_size) {
            (Some(name), Some(extensions), Some(max_size)) => Ok(Self {
                name: name.to_string(),
                allowed_extensions: extensions.iter().cloned().collect(),
                max_size,
            }),
            _ => Err(AppError::validation(MISSING_BUCKET_OPTIONS)),
        }
    }
}

/// Immutable set of buckets keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BucketRegistry {
    buckets: BTreeMap<String, Bucket>,
}

impl BucketRegistry {
    /// Validate and register every bucket. Names must be unique.
    pub fn from_options(options: &[BucketOptions]) -> AppResult<Self> {
        let mut buckets = BTreeMap::new();
        for opts in options {
            let bucket = Bucket::try_from(opts)?;
            if buckets.contains_key(&bucket.name) {
                return Err(AppError::validation(format!(
                    "Bucket '{}' is registered more than once",
                    bucket.name
                )));
            }
            buckets.insert(bucket.name.clone(), bucket);
        }
        Ok(Self { buckets })
    }

    /// Look up a bucket by name.
    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    /// Registered bucket names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Number of registered buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket is registered.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use commons_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_registers_valid_buckets() {
        let registry = BucketRegistry::from_options(&[
            BucketOptions::new("avatars", &["png", "jpeg"], 5_000_000),
            BucketOptions::new("docs", &["pdf"], 1_000),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["avatars", "docs"]);
        assert!(registry.get("avatars").unwrap().allows("png"));
        assert!(!registry.get("avatars").unwrap().allows("gif"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let cases = [
            BucketOptions {
                name: None,
                ..BucketOptions::new("x", &["png"], 1)
            },
            BucketOptions {
                allowed_extensions: Some(vec![]),
                ..BucketOptions::new("x", &["png"], 1)
            },
            BucketOptions {
                max_size: Some(0),
                ..BucketOptions::new("x", &["png"], 1)
            },
            BucketOptions {
                max_size: None,
                ..BucketOptions::new("x", &["png"], 1)
            },
        ];

        for options in cases {
            let err = BucketRegistry::from_options(&[options]).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
            assert_eq!(err.message, MISSING_BUCKET_OPTIONS);
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = BucketRegistry::from_options(&[
            BucketOptions::new("avatars", &["png"], 10),
            BucketOptions::new("avatars", &["jpeg"], 10),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
