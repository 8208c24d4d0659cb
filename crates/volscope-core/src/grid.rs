//! Contract with the external grid data source.
//!
//! The grid cache, file decoding, and map projection live outside volscope.
//! [`GridSource`] is the narrow interface the slice engine needs from them,
//! and [`GridLease`] guarantees every fetched array is handed back exactly once.

use glam::Vec3;

/// Sentinel stored in grids for absent data.
pub const MISSING: f32 = 1.0e35;

/// Values at or above this threshold are treated as missing.
pub const MISSING_THRESHOLD: f32 = 1.0e30;

/// Returns whether a grid value is the missing sentinel (or NaN).
#[inline]
#[must_use]
pub fn is_missing(value: f32) -> bool {
    value.is_nan() || value >= MISSING_THRESHOLD
}

/// Dimensions of a 3-D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridShape {
    /// Number of rows (north to south).
    pub rows: usize,
    /// Number of columns (west to east).
    pub cols: usize,
    /// Number of vertical levels.
    pub levels: usize,
}

impl GridShape {
    /// Creates a grid shape.
    #[must_use]
    pub const fn new(rows: usize, cols: usize, levels: usize) -> Self {
        Self { rows, cols, levels }
    }

    /// Total number of grid points.
    ///
    /// Panics on overflow in debug builds; use [`GridShape::checked_len`]
    /// for caller-supplied dimensions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols * self.levels
    }

    /// Total number of grid points, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn checked_len(&self) -> Option<usize> {
        match self.rows.checked_mul(self.cols) {
            Some(area) => area.checked_mul(self.levels),
            None => None,
        }
    }

    /// Returns true if any dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(row, col, level)` in a level-major, column, row array.
    #[inline]
    #[must_use]
    pub const fn index(&self, row: usize, col: usize, level: usize) -> usize {
        (level * self.cols + col) * self.rows + row
    }

    /// Component-wise maximum of two shapes.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            rows: self.rows.max(other.rows),
            cols: self.cols.max(other.cols),
            levels: self.levels.max(other.levels),
        }
    }
}

/// Horizontal world-space extent of the display box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        }
    }
}

/// Shared grid on which on-screen geometry is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayGrid {
    /// Display grid dimensions.
    pub shape: GridShape,
    /// Index of the display grid's bottom level.
    pub low_level: i32,
    /// World-space horizontal extent.
    pub extent: Extent,
}

/// Per-variable metadata supplied by the grid source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableInfo {
    /// Native storage grid dimensions.
    pub shape: GridShape,
    /// Index of the variable's bottom level.
    pub low_level: i32,
    /// Minimum of the data range mapped onto the color table.
    pub min: f32,
    /// Maximum of the data range mapped onto the color table.
    pub max: f32,
}

/// External supplier of decoded grids and grid geometry.
///
/// Implementations own caching and eviction. Arrays returned by
/// [`GridSource::fetch_grid`] are laid out as `data[(level * cols + col) * rows + row]`
/// over the variable's native shape, with absent values set to [`MISSING`].
pub trait GridSource {
    /// Fetches the 3-D array for a time step and variable.
    fn fetch_grid(&self, time: usize, variable: usize) -> Option<Vec<f32>>;

    /// Returns an array obtained from [`GridSource::fetch_grid`].
    fn release_grid(&self, time: usize, variable: usize, data: Vec<f32>);

    /// Returns metadata for a variable, or `None` if it does not exist.
    fn variable_info(&self, variable: usize) -> Option<VariableInfo>;

    /// Returns the shared display grid.
    fn display_grid(&self) -> DisplayGrid;

    /// Converts a (possibly fractional) grid level to a world-space height.
    fn level_to_height(&self, time: usize, variable: usize, level: f32) -> f32;

    /// Maps a display-grid position to fractional native-grid coordinates
    /// `(row, col, level)`.
    fn display_to_native(
        &self,
        time: usize,
        variable: usize,
        row: f32,
        col: f32,
        level: f32,
    ) -> Vec3;

    /// Whether the variable's storage grid differs from the display grid.
    fn needs_resampling(&self, _variable: usize) -> bool {
        false
    }
}

/// Scoped acquisition of a grid array.
///
/// The array goes back to the source when the lease is dropped, on every
/// exit path.
pub struct GridLease<'a, S: GridSource + ?Sized> {
    source: &'a S,
    time: usize,
    variable: usize,
    data: Option<Vec<f32>>,
}

impl<'a, S: GridSource + ?Sized> GridLease<'a, S> {
    /// Fetches a grid, returning `None` when the source has no data.
    pub fn acquire(source: &'a S, time: usize, variable: usize) -> Option<Self> {
        let data = source.fetch_grid(time, variable)?;
        Some(Self {
            source,
            time,
            variable,
            data: Some(data),
        })
    }

    /// The leased array.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl<S: GridSource + ?Sized> Drop for GridLease<'_, S> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            self.source.release_grid(self.time, self.variable, data);
        }
    }
}
