//! volscope: view-dependent slice compositing of gridded 3-D scalar fields.
//!
//! Each displayed variable is cut into a stack of axis-aligned slices facing
//! the viewer. Slice vertices carry a color-table index, stacks of several
//! variables are interleaved into one back-to-front order, and the result is
//! alpha-blended to approximate translucent volume rendering.
//!
//! # Quick Start
//!
//! ```no_run
//! use volscope::*;
//!
//! fn draw<S: GridSource>(source: &S, ctx: &mut VolumeContext) {
//!     let table = ColorTable::from_color_map(
//!         ColorMapRegistry::new().get("viridis").expect("built-in map"),
//!         96,
//!     );
//!     let layers = [VolumeLayer { variable: 0, color_table: &table }];
//!     let view = Camera::default().view_transform(1280.0, 720.0);
//!     let mut sink = RecordingSink::default();
//!
//!     let report = ctx.render_volumes(source, &layers, 0, &view, &mut sink);
//!     if !report.is_complete() {
//!         for err in &report.diagnostics {
//!             eprintln!("{err}");
//!         }
//!     }
//! }
//! ```

mod context;
mod report;

pub use context::{VolumeContext, VolumeLayer};
pub use report::FrameReport;

// Re-export core types
pub use volscope_core::{
    is_missing, Direction, DirectionStrategy, DisplayGrid, Extent, GridLease, GridShape,
    GridSource, Mat4, Quantizer, Result, SliceAxis, VariableInfo, Vec2, Vec3, Vec4,
    VolscopeError, VolumeOptions, MISSING, NO_CONTRIBUTION,
};

// Re-export render types
pub use volscope_render::{
    BlendMode, Camera, ColorMap, ColorMapRegistry, ColorTable, GpuStripSink, ProjectionMode,
    RecordedStrip, RecordingSink, RenderError, StripSink, StripVertex, ViewTransform,
};

// Re-export structures
pub use volscope_structures::{interleave, SkipReason, SliceRef, Volume};

/// Initializes logging from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("volscope {} logging initialized", env!("CARGO_PKG_VERSION"));
    }
}
