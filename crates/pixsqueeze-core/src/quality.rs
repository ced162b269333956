//! The lossy quality factor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing a [`Quality`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QualityError {
    /// Factor is NaN or outside 0.0..=1.0.
    #[error("Quality factor must be within 0.0..=1.0, got {0}")]
    OutOfRange(f32),

    /// Percentage is above 100.
    #[error("Quality percent must be within 0..=100, got {0}")]
    PercentOutOfRange(u8),
}

/// A lossy-codec quality factor in `0.0..=1.0`.
///
/// Higher values keep more detail and produce larger files. The default is
/// `0.8`. Presentation layers usually expose this as an integer percentage,
/// see [`Quality::from_percent`] and [`Quality::percent`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    /// Default quality used when nothing else is configured.
    pub const DEFAULT: Quality = Quality(0.8);

    /// Create a quality factor, rejecting NaN and values outside `0.0..=1.0`.
    pub fn new(value: f32) -> Result<Self, QualityError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QualityError::OutOfRange(value))
        }
    }

    /// Create a quality factor from an integer percentage (0-100).
    pub fn from_percent(percent: u8) -> Result<Self, QualityError> {
        if percent > 100 {
            return Err(QualityError::PercentOutOfRange(percent));
        }
        Ok(Self(f32::from(percent) / 100.0))
    }

    /// The raw factor.
    pub fn value(self) -> f32 {
        self.0
    }

    /// The factor as a rounded integer percentage.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }

    /// The factor on the JPEG encoder's 1-100 scale.
    ///
    /// The encoder has no level 0, so 0.0 maps to 1.
    pub fn jpeg_quality(self) -> u8 {
        self.percent().clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Quality {
    type Error = QualityError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}
