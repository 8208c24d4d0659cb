//! Mapping of scalar values onto color-table indices.

use crate::grid::is_missing;

/// Number of usable color-table entries (indices `0..LUT_SIZE`).
pub const LUT_SIZE: usize = 255;

/// Color-table index meaning "no contribution".
pub const NO_CONTRIBUTION: u8 = 255;

/// Largest index a valid value can map to.
pub const MAX_INDEX: u8 = (LUT_SIZE - 1) as u8;

/// Linear quantizer from a `[min, max]` data range onto `0..=254`.
///
/// Values are rounded to the nearest index (halves away from zero), so
/// `min` maps to 0 and `max` maps to 254. Missing, NaN and out-of-range
/// values map to [`NO_CONTRIBUTION`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    min: f32,
    max: f32,
    scale: f32,
}

impl Quantizer {
    /// Creates a quantizer for the given data range.
    ///
    /// A collapsed range (`max <= min`) maps exactly `min` to 0 and everything
    /// else to [`NO_CONTRIBUTION`].
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        let scale = if max > min {
            f32::from(MAX_INDEX) / (max - min)
        } else {
            0.0
        };
        Self { min, max, scale }
    }

    /// Lower bound of the data range.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the data range.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Maps a value to its color-table index.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index(&self, value: f32) -> u8 {
        if is_missing(value) || value < self.min || value > self.max {
            return NO_CONTRIBUTION;
        }
        let scaled = ((value - self.min) * self.scale).round();
        scaled.clamp(0.0, f32::from(MAX_INDEX)) as u8
    }
}
