//! Single-asset recompression.
//!
//! Every attempt re-derives from the asset's original bytes: decode to a
//! raster, encode at the requested quality, store the result. Repeated
//! compression therefore never stacks generation loss.
//!
//! The store is only touched before and after the codec runs. An asset
//! removed while its attempt is in flight is simply not updated when the
//! attempt finishes.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::asset::{AssetId, CompressedImage};
use crate::codec::ImageCodec;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::metrics::reduction_percent;
use crate::quality::Quality;
use crate::store::{CompressTicket, SharedStore};

/// A compression attempt failed. The asset is left in `Failed` and may be
/// retried.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The source raster could not be produced.
    #[error("Could not rebuild source raster: {0}")]
    Decode(#[from] DecodeError),

    /// The encoder rejected the raster.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The encoder finished without producing any bytes.
    #[error("Encoder produced no output")]
    EmptyOutput,

    /// The blocking codec task panicked or was cancelled.
    #[error("Compression task aborted: {0}")]
    Aborted(String),
}

/// Sizes reported for a successful attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSummary {
    pub id: AssetId,
    pub original_size: u64,
    pub compressed_size: u64,
    pub reduction_percent: i64,
}

/// How a compression request ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressOutcome {
    /// The asset now holds the new result.
    Compressed(CompressionSummary),
    /// No asset with that id existed when the request was made.
    Missing,
    /// The asset was removed, or a newer request started, before this one
    /// finished. Its result was dropped.
    Discarded,
}

/// Re-encodes assets held in a [`SharedStore`].
#[derive(Clone)]
pub struct CompressionEngine {
    store: SharedStore,
    codec: Arc<dyn ImageCodec>,
}

impl CompressionEngine {
    pub fn new(store: SharedStore, codec: Arc<dyn ImageCodec>) -> Self {
        Self { store, codec }
    }

    /// Compress one asset at `quality`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompressError`] when decoding or encoding fails; the asset
    /// is then in `Failed` with any earlier result kept. Failures of an
    /// attempt whose asset has since been removed are reported as
    /// [`CompressOutcome::Discarded`] instead.
    pub async fn compress(&self, id: AssetId, quality: Quality) -> Result<CompressOutcome, CompressError> {
        let Some(ticket) = self.store.write(|store| store.begin_compression(id)) else {
            debug!(%id, "Compression requested for unknown asset");
            return Ok(CompressOutcome::Missing);
        };
        debug!(%id, attempt = ticket.attempt, quality = quality.value(), "Compressing");

        match self.reencode(&ticket, quality).await {
            Ok(bytes) => self.finish(&ticket, CompressedImage::new(bytes, quality)),
            Err(e) => {
                if self.store.write(|store| store.fail_compression(&ticket)) {
                    warn!(%id, error = %e, "Compression failed");
                    Err(e)
                } else {
                    Ok(CompressOutcome::Discarded)
                }
            }
        }
    }

    async fn reencode(&self, ticket: &CompressTicket, quality: Quality) -> Result<Vec<u8>, CompressError> {
        let codec = Arc::clone(&self.codec);
        let original = Arc::clone(&ticket.original);

        let bytes = tokio::task::spawn_blocking(move || {
            let raster = codec.decode(&original)?;
            codec.encode(&raster, quality).map_err(CompressError::from)
        })
        .await
        .map_err(|e| CompressError::Aborted(e.to_string()))??;

        if bytes.is_empty() {
            return Err(CompressError::EmptyOutput);
        }
        Ok(bytes)
    }

    fn finish(&self, ticket: &CompressTicket, result: CompressedImage) -> Result<CompressOutcome, CompressError> {
        let original_size = ticket.original.len() as u64;
        let compressed_size = result.size();

        if !self.store.write(|store| store.complete_compression(ticket, result)) {
            return Ok(CompressOutcome::Discarded);
        }

        let summary = CompressionSummary {
            id: ticket.id,
            original_size,
            compressed_size,
            reduction_percent: reduction_percent(original_size, compressed_size),
        };
        info!(
            id = %ticket.id,
            original_size,
            compressed_size,
            reduction = summary.reduction_percent,
            "Compressed asset"
        );
        Ok(CompressOutcome::Compressed(summary))
    }
}
