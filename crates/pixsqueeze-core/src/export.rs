//! Handing compressed results to the save collaborator.

use std::sync::Arc;

use crate::asset::AssetId;

/// A compressed result ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub asset_id: AssetId,
    /// Suggested filename, e.g. `photo_compressed.jpg`.
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Arc<[u8]>,
}

/// Performs the actual save action (download, write to disk, ...).
///
/// Calls are fire-and-forget: the pipeline does not wait for the save to
/// complete and has no way to learn whether it did.
pub trait ExportSink: Send + Sync {
    fn save(&self, file: ExportedFile);
}

/// Sink that drops everything, for sessions that only compare sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl ExportSink for DiscardSink {
    fn save(&self, _file: ExportedFile) {}
}

/// Derive the exported filename from the original one.
///
/// The last extension is replaced: `photo.png` with suffix `_compressed` and
/// extension `jpg` becomes `photo_compressed.jpg`. A trailing dot or a dot
/// inside a directory component does not count as an extension.
pub fn export_file_name(original: &str, suffix: &str, extension: &str) -> String {
    let stem = match original.rfind('.') {
        Some(dot) if dot + 1 < original.len() && !original[dot..].contains('/') => &original[..dot],
        _ => original,
    };
    format!("{stem}{suffix}.{extension}")
}
