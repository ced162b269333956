//! Raster decoding for pixsqueeze.
//!
//! This module turns encoded image bytes (JPEG, PNG, GIF, WebP, BMP) into an
//! RGB raster that the lossy encoder can consume. EXIF orientation is applied
//! so the re-encoded output looks the way the original is displayed.
//!
//! Decoding is synchronous and CPU-bound. The async pipeline runs it on the
//! blocking pool; see [`crate::engine`].

mod raster;
mod types;

pub use raster::decode_image;
pub use types::{DecodeError, DecodedImage, Orientation};
