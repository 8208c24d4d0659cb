//! Core abstractions for volscope.
//!
//! This crate provides the fundamental types shared by the slice engine:
//! - [`Direction`] and [`SliceAxis`] for axis-aligned slicing
//! - [`GridSource`] contract with the external grid cache, plus [`GridLease`]
//! - [`Quantizer`] mapping scalar values onto color-table indices
//! - [`VolumeOptions`] configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod direction;
pub mod error;
pub mod grid;
pub mod options;
pub mod quantize;

pub use direction::{Direction, SliceAxis};
pub use error::{Result, VolscopeError};
pub use grid::{
    is_missing, DisplayGrid, Extent, GridLease, GridShape, GridSource, VariableInfo, MISSING,
};
pub use options::{DirectionStrategy, VolumeOptions};
pub use quantize::{Quantizer, LUT_SIZE, MAX_INDEX, NO_CONTRIBUTION};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
