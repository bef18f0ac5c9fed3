//! Integration tests for the upload pipeline.

use commons::ErrorKind;
use commons::files::UploadRequest;

use crate::helpers::{self, TestStorage};

#[tokio::test]
async fn test_upload_without_size_stores_decoded_bytes() {
    let storage = TestStorage::new().await;
    let png = helpers::png_bytes(4, 3);

    let url = storage
        .store
        .upload_file(&UploadRequest::new(
            "images",
            "avatars/me.png",
            helpers::data_uri("image/png", &png),
        ))
        .await
        .unwrap();

    assert_eq!(url, "http://files.test/images/avatars/me.png");
    let stored = std::fs::read(storage.object_path("images", "avatars/me.png")).unwrap();
    assert_eq!(stored, png);
    assert_eq!(storage.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_with_size_resizes_exactly() {
    let storage = TestStorage::new().await;

    storage
        .store
        .upload_file(
            &UploadRequest::new(
                "images",
                "thumb.png",
                helpers::data_uri("image/png", &helpers::png_bytes(64, 16)),
            )
            .with_size(10, 20),
        )
        .await
        .unwrap();

    let stored = std::fs::read(storage.object_path("images", "thumb.png")).unwrap();
    let image = image::load_from_memory(&stored).unwrap();
    assert_eq!((image.width(), image.height()), (10, 20));
    assert_eq!(storage.staged_files(), 0);
}

#[tokio::test]
async fn test_disallowed_extension_writes_nothing() {
    let storage = TestStorage::new().await;

    let err = storage
        .store
        .upload_file(&UploadRequest::new(
            "docs",
            "image.png",
            helpers::data_uri("image/png", &helpers::png_bytes(2, 2)),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "This file extension is not supported for this Bucket");
    assert!(!storage.object_path("docs", "image.png").exists());
    assert_eq!(storage.staged_files(), 0);
}

#[tokio::test]
async fn test_oversized_file_rejected() {
    let storage = TestStorage::new().await;

    let err = storage
        .store
        .upload_file(&UploadRequest::new(
            "docs",
            "big.pdf",
            helpers::data_uri("application/pdf", &[0u8; 2_000]),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.message, "Your file should be less than 1000 bytes");
    assert_eq!(helpers::count_files(&storage.backend_root.join("docs")), 0);
}

#[tokio::test]
async fn test_unregistered_bucket_fails_descriptively() {
    let storage = TestStorage::new().await;

    let err = storage
        .store
        .upload_file(&UploadRequest::new(
            "videos",
            "clip.png",
            helpers::data_uri("image/png", &helpers::png_bytes(2, 2)),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains("No such Bucket"));
    assert!(!storage.backend_root.join("videos").exists());
}
