//! Sequential batch operations over the asset store.
//!
//! Both batches walk a snapshot of matching ids taken when the batch starts
//! and handle one asset at a time, so at most one raster is in flight. A
//! failure on one asset is recorded and the walk continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::asset::{AssetId, AssetState};
use crate::engine::{CompressError, CompressOutcome, CompressionEngine, CompressionSummary};
use crate::encode::JPEG_CONTENT_TYPE;
use crate::export::{export_file_name, ExportSink, ExportedFile};
use crate::quality::Quality;
use crate::store::SharedStore;

/// How exported files are named and paced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Pause between consecutive saves in [`BatchOrchestrator::export_all`].
    pub delay: Duration,
    pub suffix: String,
    pub extension: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            suffix: "_compressed".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

/// Per-asset results of [`BatchOrchestrator::compress_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub compressed: Vec<CompressionSummary>,
    pub failed: Vec<(AssetId, CompressError)>,
    /// Removed or superseded while the batch was running.
    pub skipped: Vec<AssetId>,
}

impl BatchReport {
    /// Number of assets the batch selected.
    pub fn attempted(&self) -> usize {
        self.compressed.len() + self.failed.len() + self.skipped.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Drives compression and export across many assets.
#[derive(Clone)]
pub struct BatchOrchestrator {
    store: SharedStore,
    engine: CompressionEngine,
    sink: Arc<dyn ExportSink>,
    export: ExportSettings,
}

impl BatchOrchestrator {
    pub fn new(
        store: SharedStore,
        engine: CompressionEngine,
        sink: Arc<dyn ExportSink>,
        export: ExportSettings,
    ) -> Self {
        Self {
            store,
            engine,
            sink,
            export,
        }
    }

    pub fn engine(&self) -> &CompressionEngine {
        &self.engine
    }

    /// Compress every asset that is not already `Compressed`, one at a time.
    pub async fn compress_all(&self, quality: Quality) -> BatchReport {
        let targets = self.store.read(|store| store.ids_in_state(|state| !state.is_compressed()));
        let total = targets.len();
        info!("Compressing {} assets at quality {}", total, quality.percent());

        let mut report = BatchReport::default();
        for (index, id) in targets.into_iter().enumerate() {
            debug!(%id, "Batch item {}/{}", index + 1, total);
            match self.engine.compress(id, quality).await {
                Ok(CompressOutcome::Compressed(summary)) => report.compressed.push(summary),
                Ok(CompressOutcome::Missing | CompressOutcome::Discarded) => report.skipped.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }

        if report.has_failures() {
            warn!(
                "Batch compression finished with {} failed of {}",
                report.failed.len(),
                total
            );
        } else {
            info!("Batch compression finished: {} compressed", report.compressed.len());
        }
        report
    }

    /// Hand one compressed asset to the sink.
    ///
    /// Returns `false`, doing nothing, unless the asset exists and is
    /// `Compressed`.
    pub fn export(&self, id: AssetId) -> bool {
        let file = self.store.read(|store| {
            let asset = store.find(id)?;
            if !asset.state().is_compressed() {
                return None;
            }
            let compressed = asset.compressed()?;
            Some(ExportedFile {
                asset_id: id,
                file_name: export_file_name(asset.name(), &self.export.suffix, &self.export.extension),
                content_type: JPEG_CONTENT_TYPE,
                bytes: Arc::clone(compressed.bytes()),
            })
        });

        match file {
            Some(file) => {
                debug!(%id, file = %file.file_name, "Exporting");
                self.sink.save(file);
                true
            }
            None => {
                debug!(%id, "Export ignored, asset not compressed");
                false
            }
        }
    }

    /// Export every `Compressed` asset, pausing between saves.
    ///
    /// Returns the ids actually handed to the sink.
    pub async fn export_all(&self) -> Vec<AssetId> {
        let targets = self.store.read(|store| store.ids_in_state(AssetState::is_compressed));
        info!("Exporting {} assets", targets.len());

        let mut exported = Vec::with_capacity(targets.len());
        for (index, id) in targets.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.export.delay).await;
            }
            if self.export(id) {
                exported.push(id);
            }
        }
        exported
    }
}
