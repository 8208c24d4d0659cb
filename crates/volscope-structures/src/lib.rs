//! Slice stacks for volscope.
//!
//! This crate turns gridded scalar fields into drawable slice stacks:
//! - [`Volume`] buffers with their validity cache
//! - [`Traversal`] tables mapping each direction onto the grid axes
//! - [`DirectSampler`] and [`TrilinearSampler`] value lookup
//! - [`build_slices`] geometry and color-index construction
//! - [`interleave`] merging of several stacks into one draw order
//! - [`composite`] back-to-front submission of the merged stacks

// Grid indices and coordinates are freely cast between integer and float
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod composite;
pub mod interleave;
pub mod volume;

pub use composite::{composite, CompositeLayer, CompositeStats, SkipReason};
pub use interleave::{interleave, SliceRef};
pub use volume::{
    build_slices, jitter_fraction, level_heights, DirectSampler, GridPoint, Sampler, SliceFrame,
    Traversal, TrilinearSampler, Volume,
};
