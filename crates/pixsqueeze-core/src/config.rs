//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::ExportSettings;
use crate::ingest::{DEFAULT_DECODE_CONCURRENCY, DEFAULT_MAX_FILE_SIZE};
use crate::quality::Quality;
use crate::store::DEFAULT_EVENT_CAPACITY;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_file_size must be greater than zero")]
    ZeroFileSizeLimit,

    #[error("export_extension must not be empty")]
    EmptyExportExtension,

    #[error("event_capacity must be greater than zero")]
    ZeroEventCapacity,

    #[error("decode_concurrency must be greater than zero")]
    ZeroDecodeConcurrency,
}

/// Settings for one compression session.
///
/// Every field has a default, so a host config layer only needs to supply the
/// values it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quality the session starts with.
    pub default_quality: Quality,
    /// Largest accepted input in bytes.
    pub max_file_size: u64,
    /// Files decoded at once while ingesting a batch.
    pub decode_concurrency: usize,
    /// Pause between saves during export-all, in milliseconds.
    pub export_delay_ms: u64,
    /// Appended to the original file stem on export.
    pub export_suffix: String,
    /// Extension of exported files, without the dot.
    pub export_extension: String,
    /// Buffered change notifications per subscriber.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let export = ExportSettings::default();
        Self {
            default_quality: Quality::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            decode_concurrency: DEFAULT_DECODE_CONCURRENCY,
            export_delay_ms: export.delay.as_millis() as u64,
            export_suffix: export.suffix,
            export_extension: export.extension,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == 0 {
            return Err(ConfigError::ZeroFileSizeLimit);
        }
        if self.decode_concurrency == 0 {
            return Err(ConfigError::ZeroDecodeConcurrency);
        }
        if self.export_extension.trim().is_empty() {
            return Err(ConfigError::EmptyExportExtension);
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            delay: Duration::from_millis(self.export_delay_ms),
            suffix: self.export_suffix.clone(),
            extension: self.export_extension.trim_start_matches('.').to_string(),
        }
    }
}
