//! Drawing surface for composited slice stacks.
//!
//! The compositor emits quad strips through [`StripSink`]. A strip of `2n`
//! vertices alternates between two adjacent vertex rows, so vertices `2j`
//! and `2j + 1` sit in the same column.

/// Framebuffer blending applied to submitted strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    Replace,
    /// Source alpha over destination (`src * a + dst * (1 - a)`).
    AlphaOver,
}

/// One colored vertex of a quad strip.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StripVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// RGBA color from the variable's color table.
    pub color: [u8; 4],
}

/// Receiver of quad strips with a mutable blend state.
pub trait StripSink {
    /// Current blend mode.
    fn blend_mode(&self) -> BlendMode;

    /// Changes the blend mode for subsequent strips.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Draws one quad strip.
    fn draw_quad_strip(&mut self, vertices: &[StripVertex]);
}

/// A strip captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStrip {
    /// Blend mode active when the strip was drawn.
    pub blend: BlendMode,
    pub vertices: Vec<StripVertex>,
}

/// CPU sink that keeps every strip for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    blend: BlendMode,
    strips: Vec<RecordedStrip>,
    blend_changes: usize,
}

impl RecordingSink {
    /// Creates a sink starting in the given blend mode.
    pub fn new(blend: BlendMode) -> Self {
        Self {
            blend,
            ..Self::default()
        }
    }

    /// Strips drawn so far, in submission order.
    pub fn strips(&self) -> &[RecordedStrip] {
        &self.strips
    }

    /// Number of times the blend mode was set.
    pub fn blend_changes(&self) -> usize {
        self.blend_changes
    }

    /// Forgets recorded strips, keeping the blend state.
    pub fn clear(&mut self) {
        self.strips.clear();
        self.blend_changes = 0;
    }
}

impl StripSink for RecordingSink {
    fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.blend_changes += 1;
    }

    fn draw_quad_strip(&mut self, vertices: &[StripVertex]) {
        self.strips.push(RecordedStrip {
            blend: self.blend,
            vertices: vertices.to_vec(),
        });
    }
}

/// Appends the triangle-list form of a quad strip to `out`.
///
/// Each quad between columns `j` and `j + 1` becomes two triangles. A
/// trailing odd vertex is ignored.
pub fn strip_to_triangles(strip: &[StripVertex], out: &mut Vec<StripVertex>) {
    let pairs = strip.len() / 2;
    for j in 1..pairs {
        let (a, b) = (strip[2 * j - 2], strip[2 * j - 1]);
        let (c, d) = (strip[2 * j], strip[2 * j + 1]);
        out.extend_from_slice(&[a, b, c, c, b, d]);
    }
}
