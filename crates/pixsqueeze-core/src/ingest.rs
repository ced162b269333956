//! Validation and admission of raw input files.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::asset::{AssetId, ImageAsset};
use crate::codec::ImageCodec;
use crate::decode::DecodeError;
use crate::store::SharedStore;

/// Largest accepted input: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Files decoded at once during a batch ingest.
pub const DEFAULT_DECODE_CONCURRENCY: usize = 4;

/// True for `image/*` MIME types.
///
/// Drop and picker collaborators use this to decide what to forward; the
/// [`Ingestor`] itself does not filter on content type.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// A file handed over by the input boundary.
#[derive(Debug, Clone)]
pub struct RawFile {
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the declared content type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type().is_some_and(is_image_content_type)
    }
}

/// Per-file ingestion failure. Never fatal to the rest of a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File is larger than the configured limit.
    #[error("{name} exceeds the {limit} byte limit ({size} bytes)")]
    OversizeRejected { name: String, size: u64, limit: u64 },

    /// File content could not be decoded as an image.
    #[error("Could not decode {name}: {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: DecodeError,
    },
}

impl IngestError {
    /// Name of the file the error refers to.
    pub fn file_name(&self) -> &str {
        match self {
            IngestError::OversizeRejected { name, .. } | IngestError::DecodeFailed { name, .. } => name,
        }
    }
}

/// Outcome of ingesting a batch of files.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Ids of admitted assets, in input order.
    pub admitted: Vec<AssetId>,
    /// Rejected files, in input order.
    pub rejected: Vec<IngestError>,
}

/// Turns raw files into stored assets.
#[derive(Clone)]
pub struct Ingestor {
    store: SharedStore,
    codec: Arc<dyn ImageCodec>,
    max_file_size: u64,
    decode_concurrency: usize,
}

impl Ingestor {
    pub fn new(store: SharedStore, codec: Arc<dyn ImageCodec>, max_file_size: u64) -> Self {
        Self {
            store,
            codec,
            max_file_size,
            decode_concurrency: DEFAULT_DECODE_CONCURRENCY,
        }
    }

    /// Cap the number of full rasters held at once by [`ingest_batch`](Self::ingest_batch).
    pub fn with_decode_concurrency(mut self, limit: usize) -> Self {
        self.decode_concurrency = limit.max(1);
        self
    }

    /// Validate, decode and admit a single file.
    pub async fn ingest(&self, file: RawFile) -> Result<AssetId, IngestError> {
        let asset = self.prepare(file).await?;
        Ok(self.admit(asset))
    }

    /// Ingest many files.
    ///
    /// At most `decode_concurrency` files are decoded at a time. Admission
    /// happens in input order once all have settled. Rejections are
    /// collected, not propagated.
    pub async fn ingest_batch(&self, files: Vec<RawFile>) -> IngestReport {
        let total = files.len();
        debug!(total, limit = self.decode_concurrency, "Decoding batch");
        let prepared: Vec<_> = stream::iter(files)
            .map(|file| self.prepare(file))
            .buffered(self.decode_concurrency)
            .collect()
            .await;

        let mut report = IngestReport::default();
        for result in prepared {
            match result {
                Ok(asset) => report.admitted.push(self.admit(asset)),
                Err(e) => report.rejected.push(e),
            }
        }

        if report.rejected.is_empty() {
            info!("Ingested {} files", total);
        } else {
            warn!(
                "Ingested {} of {} files ({} rejected)",
                report.admitted.len(),
                total,
                report.rejected.len()
            );
        }
        report
    }

    async fn prepare(&self, file: RawFile) -> Result<ImageAsset, IngestError> {
        let size = file.size();
        let RawFile { name, bytes, .. } = file;

        if size > self.max_file_size {
            warn!(file = %name, size, limit = self.max_file_size, "Rejected oversize file");
            return Err(IngestError::OversizeRejected {
                name,
                size,
                limit: self.max_file_size,
            });
        }

        let original: Arc<[u8]> = bytes.into();
        let input = Arc::clone(&original);
        let codec = Arc::clone(&self.codec);
        let decoded = tokio::task::spawn_blocking(move || {
            codec
                .decode(&input)
                .map(|raster| (raster.width, raster.height))
        })
        .await
        .unwrap_or_else(|e| Err(DecodeError::CorruptedFile(format!("decoder aborted: {e}"))));

        match decoded {
            Ok((width, height)) => {
                debug!(file = %name, width, height, size, "Decoded input");
                Ok(ImageAsset::new(name, original, width, height))
            }
            Err(source) => {
                warn!(file = %name, error = %source, "Rejected undecodable file");
                Err(IngestError::DecodeFailed { name, source })
            }
        }
    }

    fn admit(&self, asset: ImageAsset) -> AssetId {
        let id = asset.id();
        debug!(%id, file = asset.name(), "Admitted asset");
        self.store.write(|store| store.add(asset));
        id
    }
}
