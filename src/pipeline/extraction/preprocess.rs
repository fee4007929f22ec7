//! Image preparation ahead of OCR.
//!
//! Uploads arrive as JPEG, PNG, BMP, TIFF, GIF or WebP. Tesseract is happiest with a
//! single lossless grayscale format, so every image is decoded once and
//! re-encoded as an 8-bit grayscale PNG.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use tracing::debug;

use super::ExtractionError;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Largest accepted side, in pixels. Phone photos sit well below this.
const MAX_DIMENSION: u32 = 12_000;

/// Decode `image_bytes` and re-encode as a grayscale PNG for OCR.
pub fn prepare_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    if image_bytes.is_empty() {
        return Err(ExtractionError::ImageProcessing("empty image".into()));
    }
    if image_bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(format!(
            "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
            image_bytes.len()
        )));
    }

    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("cannot decode image: {e}")))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ExtractionError::ImageProcessing(format!(
            "unsupported image dimensions {width}x{height}"
        )));
    }

    let gray = DynamicImage::ImageLuma8(decoded.to_luma8());
    let mut cursor = Cursor::new(Vec::new());
    gray.write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

    debug!(width, height, "Image normalized to grayscale PNG for OCR");
    Ok(cursor.into_inner())
}
