//! Per-variable slice stacks.

mod builder;
mod sampler;
mod traversal;

pub use builder::*;
pub use sampler::*;
pub use traversal::*;

use volscope_core::{Direction, GridShape, Result, VolscopeError};

/// Render buffers holding one variable's slice stack.
///
/// `Volume` stores a vertex position and a color-table index for every
/// grid point of every slice, along with the direction the stack was built
/// for and whether it still matches the current frame.
///
/// Buffer capacity grows to the largest shape ever requested for the slot
/// and is never shrunk while the slot lives.
#[derive(Debug, Clone)]
pub struct Volume {
    variable: usize,

    // Geometry
    vertices: Vec<[f32; 3]>,
    indices: Vec<u8>,
    capacity: GridShape,

    // Stack layout of the last build
    slices: usize,
    rows: usize,
    cols: usize,

    // Validity cache
    direction: Option<Direction>,
    valid: bool,
}

impl Volume {
    /// Allocates a volume able to hold a grid of up to `max_shape` points.
    pub fn allocate(variable: usize, max_shape: GridShape) -> Result<Self> {
        let mut volume = Self {
            variable,
            vertices: Vec::new(),
            indices: Vec::new(),
            capacity: GridShape::default(),
            slices: 0,
            rows: 0,
            cols: 0,
            direction: None,
            valid: false,
        };
        volume.ensure_capacity(max_shape)?;
        Ok(volume)
    }

    /// Number of bytes of buffer storage a grid of the given shape needs.
    ///
    /// Saturates at `usize::MAX` when the shape's point count overflows.
    #[must_use]
    pub fn bytes_for(shape: GridShape) -> usize {
        shape.checked_len().map_or(usize::MAX, |points| {
            points.saturating_mul(std::mem::size_of::<[f32; 3]>() + std::mem::size_of::<u8>())
        })
    }

    /// Grows the buffers so a grid of `shape` fits. Never shrinks.
    pub fn ensure_capacity(&mut self, shape: GridShape) -> Result<()> {
        let wanted = self.capacity.max(shape);
        if wanted == self.capacity {
            return Ok(());
        }

        let variable = self.variable;
        let out_of_memory = || VolscopeError::OutOfMemory {
            variable,
            bytes: Self::bytes_for(wanted),
        };
        let points = wanted.checked_len().ok_or_else(out_of_memory)?;
        self.slices = 0;
        self.valid = false;
        self.vertices.clear();
        self.indices.clear();
        self.vertices
            .try_reserve_exact(points)
            .map_err(|_| out_of_memory())?;
        self.indices
            .try_reserve_exact(points)
            .map_err(|_| out_of_memory())?;

        log::debug!(
            "volume for variable {} grown to {}x{}x{}",
            self.variable,
            wanted.rows,
            wanted.cols,
            wanted.levels
        );
        self.capacity = wanted;
        Ok(())
    }

    /// Variable this volume belongs to.
    #[must_use]
    pub fn variable(&self) -> usize {
        self.variable
    }

    /// Largest grid shape the buffers were sized for.
    #[must_use]
    pub fn capacity(&self) -> GridShape {
        self.capacity
    }

    /// Number of slices in the stack.
    #[must_use]
    pub fn slices(&self) -> usize {
        self.slices
    }

    /// Number of vertex rows per slice.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of vertex columns per slice.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Direction of the last build.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Whether the stack matches the current frame's data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Marks the stack stale so the next frame rebuilds it.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether the stack has to be rebuilt to draw in `direction`.
    #[must_use]
    pub fn needs_rebuild(&self, direction: Direction) -> bool {
        !self.valid || self.direction != Some(direction)
    }

    /// All vertex positions, slice after slice.
    #[must_use]
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// All color-table indices, parallel to [`Volume::vertices`].
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Vertex positions of one slice (`rows * cols` entries, row-major).
    #[must_use]
    pub fn slice_vertices(&self, slice: usize) -> Option<&[[f32; 3]]> {
        let range = self.slice_range(slice)?;
        self.vertices.get(range)
    }

    /// Color-table indices of one slice (`rows * cols` entries, row-major).
    #[must_use]
    pub fn slice_indices(&self, slice: usize) -> Option<&[u8]> {
        let range = self.slice_range(slice)?;
        self.indices.get(range)
    }

    fn slice_range(&self, slice: usize) -> Option<std::ops::Range<usize>> {
        if slice >= self.slices {
            return None;
        }
        let len = self.rows * self.cols;
        Some(slice * len..(slice + 1) * len)
    }

    /// Starts a new build, discarding the previous stack.
    pub(crate) fn begin_build(
        &mut self,
        direction: Direction,
        slices: usize,
        rows: usize,
        cols: usize,
    ) {
        self.vertices.clear();
        self.indices.clear();
        self.slices = slices;
        self.rows = rows;
        self.cols = cols;
        self.direction = Some(direction);
        self.valid = false;
    }

    #[inline]
    pub(crate) fn push(&mut self, position: [f32; 3], index: u8) {
        self.vertices.push(position);
        self.indices.push(index);
    }

    pub(crate) fn finish_build(&mut self) {
        debug_assert_eq!(self.vertices.len(), self.slices * self.rows * self.cols);
        self.valid = true;
    }
}
