//! Rendering backend for volscope.
//!
//! This crate provides:
//! - View transforms and slicing-direction selection
//! - Color maps and per-variable color tables
//! - The [`StripSink`] drawing interface with CPU and wgpu implementations

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod camera;
pub mod color_maps;
pub mod compositor;
pub mod error;
pub mod volume_slice_render;

pub use camera::{
    depth_gradient_direction, projected_axes_direction, Camera, ProjectionMode, ViewTransform,
};
pub use color_maps::{ColorMap, ColorMapRegistry, ColorTable, COLOR_TABLE_SIZE};
pub use compositor::{BlendMode, RecordedStrip, RecordingSink, StripSink, StripVertex};
pub use error::{RenderError, RenderResult};
pub use volume_slice_render::{GpuStripSink, SliceBatches, SliceCameraUniforms};
