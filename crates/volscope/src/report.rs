//! Per-frame outcome of [`crate::VolumeContext::render_volumes`].

use volscope_core::{Direction, VolscopeError};
use volscope_structures::SkipReason;

/// What a frame drew and what went wrong along the way.
#[derive(Debug)]
pub struct FrameReport {
    /// Slicing direction used for the frame.
    pub direction: Direction,
    /// Draw-order entries that produced strips.
    pub entries: usize,
    /// Quad strips submitted to the sink.
    pub strips: usize,
    /// Variables whose slices were skipped by the compositor, with the reason.
    pub skipped: Vec<(usize, SkipReason)>,
    /// Errors recovered from while preparing the frame.
    pub diagnostics: Vec<VolscopeError>,
}

impl FrameReport {
    pub(crate) fn new(direction: Direction) -> Self {
        Self {
            direction,
            entries: 0,
            strips: 0,
            skipped: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Whether every displayed volume was drawn without trouble.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.diagnostics.is_empty()
    }
}
