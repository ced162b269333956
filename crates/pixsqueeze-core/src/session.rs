//! The session façade used by the presentation layer.
//!
//! A [`Session`] owns the asset store, the session-wide quality setting and
//! the pipeline components wired to them. The quality is read once per
//! request and passed down explicitly, so changing it never affects results
//! that already exist.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::asset::{AssetId, AssetState, AssetView, ImageAsset};
use crate::batch::{BatchOrchestrator, BatchReport};
use crate::codec::{ImageCodec, JpegCodec};
use crate::config::SessionConfig;
use crate::engine::{CompressOutcome, CompressionEngine};
use crate::error::Result;
use crate::export::ExportSink;
use crate::ingest::{IngestReport, Ingestor, RawFile};
use crate::quality::Quality;
use crate::store::{AssetEvent, AssetStore, SharedStore};

pub struct Session {
    store: SharedStore,
    quality: Mutex<Quality>,
    ingestor: Ingestor,
    batch: BatchOrchestrator,
}

impl Session {
    /// Create a session that re-encodes with [`JpegCodec`].
    pub fn new(config: SessionConfig, sink: Arc<dyn ExportSink>) -> Result<Self> {
        Self::with_codec(config, Arc::new(JpegCodec), sink)
    }

    /// Create a session with a custom codec.
    pub fn with_codec(
        config: SessionConfig,
        codec: Arc<dyn ImageCodec>,
        sink: Arc<dyn ExportSink>,
    ) -> Result<Self> {
        config.validate()?;

        let store = SharedStore::new(AssetStore::new(config.event_capacity));
        let ingestor = Ingestor::new(store.clone(), Arc::clone(&codec), config.max_file_size)
            .with_decode_concurrency(config.decode_concurrency);
        let engine = CompressionEngine::new(store.clone(), codec);
        let batch = BatchOrchestrator::new(store.clone(), engine, sink, config.export_settings());

        debug!(?config, "Session created");
        Ok(Self {
            store,
            quality: Mutex::new(config.default_quality),
            ingestor,
            batch,
        })
    }

    /// Quality used by the next compress request.
    pub fn quality(&self) -> Quality {
        *self.quality.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_quality(&self, quality: Quality) {
        *self.quality.lock().unwrap_or_else(PoisonError::into_inner) = quality;
        debug!(quality = quality.value(), "Quality changed");
    }

    /// Set the quality from a slider percentage (0-100).
    pub fn set_quality_percent(&self, percent: u8) -> Result<()> {
        self.set_quality(Quality::from_percent(percent)?);
        Ok(())
    }

    /// Ingest a batch of files; see [`Ingestor::ingest_batch`].
    pub async fn ingest(&self, files: Vec<RawFile>) -> IngestReport {
        self.ingestor.ingest_batch(files).await
    }

    /// Ingest one file.
    pub async fn ingest_file(&self, file: RawFile) -> Result<AssetId> {
        Ok(self.ingestor.ingest(file).await?)
    }

    /// Compress one asset at the current quality.
    pub async fn compress(&self, id: AssetId) -> Result<CompressOutcome> {
        let quality = self.quality();
        Ok(self.batch.engine().compress(id, quality).await?)
    }

    /// Compress every asset that is not `Compressed` at the current quality.
    pub async fn compress_all(&self) -> BatchReport {
        self.batch.compress_all(self.quality()).await
    }

    /// Export one asset. Ignored unless it is `Compressed`.
    pub fn export(&self, id: AssetId) -> bool {
        self.batch.export(id)
    }

    /// Export every `Compressed` asset.
    pub async fn export_all(&self) -> Vec<AssetId> {
        self.batch.export_all().await
    }

    /// Remove one asset. An in-flight compression for it finishes silently.
    pub fn remove(&self, id: AssetId) -> bool {
        let removed = self.store.write(|store| store.remove(id)).is_some();
        if removed {
            debug!(%id, "Removed asset");
        }
        removed
    }

    /// Remove every asset. Confirmation is the caller's job.
    pub fn clear(&self) -> usize {
        let count = self.store.write(AssetStore::clear);
        if count > 0 {
            info!("Cleared {} assets", count);
        }
        count
    }

    /// Display snapshots of all assets, in store order.
    pub fn assets(&self) -> Vec<AssetView> {
        self.store
            .read(|store| store.all().iter().map(ImageAsset::view).collect())
    }

    /// Full record of one asset, including its original and compressed bytes.
    pub fn asset(&self, id: AssetId) -> Option<ImageAsset> {
        self.store.read(|store| store.find(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.store.read(AssetStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.store.read(AssetStore::is_empty)
    }

    /// Whether compress-all has anything to do.
    pub fn has_uncompressed(&self) -> bool {
        self.store
            .read(|store| store.all().iter().any(|a| !a.state().is_compressed()))
    }

    /// Whether export-all has anything to do.
    pub fn has_compressed(&self) -> bool {
        self.store
            .read(|store| store.all().iter().any(|a| a.state() == AssetState::Compressed))
    }

    /// Subscribe to store change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AssetEvent> {
        self.store.read(AssetStore::subscribe)
    }
}
