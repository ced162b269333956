//! Crate-level error type.
//!
//! Each stage has its own error enum; this one wraps them for callers that
//! want a single type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::CompressError;
use crate::ingest::IngestError;
use crate::quality::QualityError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid quality: {0}")]
    Quality(#[from] QualityError),

    #[error("Ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Compression failed: {0}")]
    Compress(#[from] CompressError),
}

/// Convenience result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
