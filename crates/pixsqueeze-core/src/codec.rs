//! The decode/encode seam used by ingestion and compression.

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_jpeg, EncodeError};
use crate::quality::Quality;

/// Synchronous raster codec.
///
/// Implementations are CPU-bound; callers run them on the blocking pool.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decode encoded bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;

    /// Lossily encode a raster at `quality`.
    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError>;
}

/// Decodes any supported input format and re-encodes as JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode_image(bytes)
    }

    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        encode_jpeg(image, quality)
    }
}
