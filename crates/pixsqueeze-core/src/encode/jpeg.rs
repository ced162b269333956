//! JPEG encoding for recompression.
//!
//! Uses the `image` crate's baseline JPEG encoder. Output is deterministic for
//! a given raster and quality, which keeps recompression idempotent.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::quality::Quality;

/// MIME type of everything this module produces.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGB raster to JPEG bytes at the given quality.
///
/// The 0–1 quality factor is mapped onto the encoder's 1–100 scale; see
/// [`Quality::jpeg_quality`].
///
/// # Errors
///
/// Returns an error if the raster has a zero dimension, if the pixel buffer
/// does not match `width * height * 3`, or if the encoder fails.
pub fn encode_jpeg(image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * 3;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality())
        .write_image(&image.pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
