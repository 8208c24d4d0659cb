//! Error types for volscope.

use thiserror::Error;

/// The main error type for volscope operations.
#[derive(Error, Debug)]
pub enum VolscopeError {
    /// The slice buffers for a variable could not be reserved.
    #[error("insufficient memory for volume rendering of variable {variable} ({bytes} bytes needed)")]
    OutOfMemory { variable: usize, bytes: usize },

    /// The grid has too few levels to be rendered as a volume.
    #[error("variable {variable} has {levels} level(s), volume rendering needs at least {required}")]
    DegenerateGrid {
        variable: usize,
        levels: usize,
        required: usize,
    },

    /// No volume slot exists for the variable.
    #[error("no volume slot allocated for variable {0}")]
    VolumeNotAllocated(usize),

    /// Volumetric display was disabled for the variable after a failed allocation.
    #[error("volume rendering disabled for variable {0}")]
    VolumeDisabled(usize),

    /// The grid source had no data for the requested time step and variable.
    #[error("no grid data for time step {time}, variable {variable}")]
    DataUnavailable { time: usize, variable: usize },

    /// The grid source does not know the variable.
    #[error("unknown variable {0}")]
    UnknownVariable(usize),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An option value is outside its accepted range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for volscope operations.
pub type Result<T> = std::result::Result<T, VolscopeError>;
