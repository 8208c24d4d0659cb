//! Configuration options for volume rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolscopeError};

/// Options controlling how volumes are sliced and composited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeOptions {
    /// How the slicing direction is derived from the view.
    pub direction_strategy: DirectionStrategy,

    /// Whether to draw with `interactive_stride` instead of full resolution.
    pub fast_draw: bool,

    /// Row/column stride used while `fast_draw` is set. Values below 1 act as 1.
    pub interactive_stride: usize,

    /// Largest depth jitter, as a fraction of one grid spacing, applied to the
    /// last of several simultaneously displayed volumes.
    pub depth_jitter: f32,

    /// Minimum number of levels a variable needs to get a volume slot.
    pub min_levels: usize,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            direction_strategy: DirectionStrategy::DepthGradient,
            fast_draw: false,
            interactive_stride: 2,
            depth_jitter: 0.1,
            min_levels: 2,
        }
    }
}

impl VolumeOptions {
    /// Parses options from JSON text. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every option is within its accepted range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.depth_jitter) {
            return Err(VolscopeError::InvalidOption(format!(
                "depth_jitter must be in [0, 1), got {}",
                self.depth_jitter
            )));
        }
        if self.min_levels == 0 {
            return Err(VolscopeError::InvalidOption(
                "min_levels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Stride to composite with, never below 1.
    #[must_use]
    pub fn effective_stride(&self) -> usize {
        if self.fast_draw {
            self.interactive_stride.max(1)
        } else {
            1
        }
    }
}

/// Strategy for choosing the slicing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectionStrategy {
    /// Use the depth row of the combined view-projection matrix.
    #[default]
    DepthGradient,
    /// Project the unit axes to the window and slice along the shortest one.
    ProjectedAxes,
}
