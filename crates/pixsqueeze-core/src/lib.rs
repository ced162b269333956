//! pixsqueeze core - batch lossy recompression of raster images
//!
//! This crate holds everything except the presentation layer: admitting
//! files, the per-image compression state machine, JPEG re-encoding at an
//! adjustable quality, sequential batch compress/export, and size metrics.
//!
//! # Module Structure
//!
//! - `asset` / `store` - Image records and the ordered, shared collection
//! - `ingest` - Size validation and decode-checked admission of raw files
//! - `engine` - Single-asset recompression from the original bytes
//! - `batch` - Sequential compress-all and paced export-all
//! - `decode` / `encode` / `codec` - Raster decode and JPEG encode
//! - `metrics` - Human-readable sizes and reduction percentages
//! - `session` - Façade owning the store and the quality setting
//!
//! # Concurrency
//!
//! Codec work runs on tokio's blocking pool and is awaited; batch operations
//! handle one asset at a time. Store updates happen inside short closures
//! that cannot await, so no record is ever observed half-updated.
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use pixsqueeze_core::{DiscardSink, RawFile, Session, SessionConfig};
//!
//! let session = Session::new(SessionConfig::default(), Arc::new(DiscardSink))?;
//! let bytes = std::fs::read("photo.png")?;
//! session.ingest(vec![RawFile::new("photo.png", bytes)]).await;
//! session.set_quality_percent(70)?;
//! let report = session.compress_all().await;
//! ```

pub mod asset;
pub mod batch;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod quality;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use asset::{AssetId, AssetState, AssetView, CompressedImage, ImageAsset};
pub use batch::{BatchOrchestrator, BatchReport, ExportSettings};
pub use codec::{ImageCodec, JpegCodec};
pub use config::{ConfigError, SessionConfig};
pub use engine::{CompressError, CompressOutcome, CompressionEngine, CompressionSummary};
pub use error::{Error, Result};
pub use export::{export_file_name, DiscardSink, ExportSink, ExportedFile};
pub use ingest::{is_image_content_type, IngestError, IngestReport, Ingestor, RawFile};
pub use metrics::{format_size, reduction_percent};
pub use quality::{Quality, QualityError};
pub use session::Session;
pub use store::{AssetEvent, AssetStore, SharedStore};
