//! Exact-size image resizing.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::FilterType;

use commons_core::error::{AppError, ErrorKind};
use commons_core::result::AppResult;

/// Largest accepted target area, in pixels.
pub const MAX_RESIZE_PIXELS: u64 = 50_000_000;

/// Target dimensions of a resized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are set.
    pub fn is_set(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Reject targets whose pixel buffer would exceed `MAX_RESIZE_PIXELS`.
    pub fn check_limit(&self) -> AppResult<()> {
        let pixels = u64::from(self.width) * u64::from(self.height);
        if pixels > MAX_RESIZE_PIXELS {
            return Err(AppError::validation(format!(
                "Requested image size {}x{} exceeds the limit of {MAX_RESIZE_PIXELS} pixels",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Resize to `size` when it is set, otherwise return the bytes unchanged.
///
/// Decoding and encoding run on the blocking thread pool.
pub async fn resize_if_requested(data: Bytes, size: Option<ImageSize>) -> AppResult<Bytes> {
    let Some(size) = size.filter(ImageSize::is_set) else {
        return Ok(data);
    };

    tokio::task::spawn_blocking(move || resize_exact(&data, size))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Resize task panicked", e))?
}

/// Resize to exactly `size`, ignoring aspect ratio, and re-encode in the
/// source format.
pub fn resize_exact(data: &[u8], size: ImageSize) -> AppResult<Bytes> {
    size.check_limit()?;

    let format = image::guess_format(data).map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Unrecognized image format", e)
    })?;
    let source = image::load_from_memory_with_format(data, format).map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Failed to decode image", e)
    })?;

    let resized = source.resize_exact(size.width, size.height, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, format).map_err(|e| {
        AppError::with_source(ErrorKind::Internal, "Failed to encode resized image", e)
    })?;

    tracing::debug!(
        width = size.width,
        height = size.height,
        format = ?format,
        bytes = out.get_ref().len(),
        "Resized image"
    );

    Ok(Bytes::from(out.into_inner()))
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_resize_exact_ignores_aspect_ratio() {
        let resized = resize_exact(&png(40, 10), ImageSize::new(8, 8)).unwrap();
        assert_eq!(image::guess_format(&resized).unwrap(), ImageFormat::Png);

        let decoded = image::load_from_memory(&resized).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_non_image_rejected() {
        let err = resize_exact(b"plain text", ImageSize::new(8, 8)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_oversized_target_rejected_before_decode() {
        let err = resize_exact(&png(4, 4), ImageSize::new(100_000, 100_000)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(ImageSize::new(5_000, 10_000).check_limit().is_ok());
        assert!(ImageSize::new(5_000, 10_001).check_limit().is_err());
    }

    #[tokio::test]
    async fn test_passthrough_without_full_size() {
        let data = Bytes::from_static(b"not an image");
        let out = resize_if_requested(data.clone(), Some(ImageSize::new(10, 0)))
            .await
            .unwrap();
        assert_eq!(out, data);
        assert_eq!(resize_if_requested(data.clone(), None).await.unwrap(), data);
    }
}
