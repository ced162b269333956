//! The image asset record and its per-image state machine.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{format_size, reduction_percent};
use crate::quality::Quality;

/// Stable identifier of an asset.
///
/// Backed by a UUIDv7: a millisecond timestamp followed by random bits, so
/// ids minted in the same millisecond never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Mint a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Compression state of one asset.
///
/// `Ingested → Compressing → Compressed | Failed`. Both terminal states may
/// re-enter `Compressing` on a new request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Admitted, never compressed.
    Ingested,
    /// A compression attempt is in flight.
    Compressing,
    /// The latest attempt succeeded.
    Compressed,
    /// The latest attempt failed. Retryable.
    Failed,
}

impl AssetState {
    pub fn is_compressed(self) -> bool {
        self == AssetState::Compressed
    }
}

/// Result of a successful compression.
///
/// Bytes and size live together so neither can be set without the other.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    bytes: Arc<[u8]>,
    quality: Quality,
}

impl CompressedImage {
    pub fn new(bytes: Vec<u8>, quality: Quality) -> Self {
        Self {
            bytes: bytes.into(),
            quality,
        }
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Quality the bytes were encoded at.
    pub fn quality(&self) -> Quality {
        self.quality
    }
}

/// One ingested image and its compression state.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    id: AssetId,
    name: String,
    original: Arc<[u8]>,
    width: u32,
    height: u32,
    compressed: Option<CompressedImage>,
    state: AssetState,
    /// Bumped on every compression request; completions carrying an older
    /// value are stale.
    pub(crate) attempt: u64,
}

impl ImageAsset {
    /// Build a freshly ingested asset.
    ///
    /// `width`/`height` are the oriented dimensions found while decoding.
    pub fn new(
        name: impl Into<String>,
        original: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: AssetId::generate(),
            name: name.into(),
            original: original.into(),
            width,
            height,
            compressed: None,
            state: AssetState::Ingested,
            attempt: 0,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original encoded bytes. Never modified.
    pub fn original(&self) -> &Arc<[u8]> {
        &self.original
    }

    pub fn original_size(&self) -> u64 {
        self.original.len() as u64
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn compressed(&self) -> Option<&CompressedImage> {
        self.compressed.as_ref()
    }

    pub fn compressed_size(&self) -> Option<u64> {
        self.compressed.as_ref().map(CompressedImage::size)
    }

    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Reduction from original to the latest compressed result, if any.
    pub fn reduction_percent(&self) -> Option<i64> {
        self.compressed_size()
            .map(|size| reduction_percent(self.original_size(), size))
    }

    pub(crate) fn set_state(&mut self, state: AssetState) {
        self.state = state;
    }

    pub(crate) fn set_compressed(&mut self, compressed: CompressedImage) {
        self.compressed = Some(compressed);
        self.state = AssetState::Compressed;
    }

    /// Snapshot for the display boundary.
    pub fn view(&self) -> AssetView {
        AssetView {
            id: self.id,
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            state: self.state,
            original_size: self.original_size(),
            original_size_label: format_size(self.original_size()),
            compressed_size: self.compressed_size(),
            compressed_size_label: self.compressed_size().map(format_size),
            reduction_percent: self.reduction_percent(),
        }
    }
}

/// What the presentation layer renders for one asset.
///
/// The reduction is recomputed from the stored sizes on every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetView {
    pub id: AssetId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub state: AssetState,
    pub original_size: u64,
    pub original_size_label: String,
    pub compressed_size: Option<u64>,
    pub compressed_size_label: Option<String>,
    pub reduction_percent: Option<i64>,
}
