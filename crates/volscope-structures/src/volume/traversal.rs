//! Traversal order of the grid for each slicing direction.
//!
//! A [`Traversal`] names which grid axis supplies the slices, the rows and
//! the columns of a stack, and whether each is walked forward or backward.
//! Walking the table in slice, row, column order visits the grid from the
//! far side of the volume to the near side for the given direction.

use volscope_core::{Direction, GridShape, SliceAxis};

/// One axis of a traversal and its walking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisWalk {
    /// Grid axis being walked.
    pub axis: SliceAxis,
    /// Walk from the last index down to 0.
    pub descending: bool,
}

impl AxisWalk {
    const fn forward(axis: SliceAxis) -> Self {
        Self {
            axis,
            descending: false,
        }
    }

    const fn backward(axis: SliceAxis) -> Self {
        Self {
            axis,
            descending: true,
        }
    }

    /// Number of steps along this axis for a grid of `shape`.
    #[must_use]
    pub fn len(&self, shape: GridShape) -> usize {
        match self.axis {
            SliceAxis::Row => shape.rows,
            SliceAxis::Column => shape.cols,
            SliceAxis::Level => shape.levels,
        }
    }

    /// Grid index visited at `step` of a walk of length `len`.
    #[inline]
    #[must_use]
    pub fn index(&self, step: usize, len: usize) -> usize {
        if self.descending {
            len - 1 - step
        } else {
            step
        }
    }
}

/// Grid position in native `(row, col, level)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub row: usize,
    pub col: usize,
    pub level: usize,
}

/// Axis assignment and walking order of a slice stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Axis stepped once per slice.
    pub slice: AxisWalk,
    /// Axis stepped once per vertex row within a slice.
    pub row: AxisWalk,
    /// Axis stepped once per vertex within a row.
    pub col: AxisWalk,
}

impl Traversal {
    /// Returns the traversal for a slicing direction.
    ///
    /// Horizontal stacks keep grid rows and columns as slice rows and
    /// columns. Vertical stacks use levels (top first) as slice rows, and
    /// the remaining horizontal axis as slice columns.
    #[must_use]
    pub const fn for_direction(direction: Direction) -> Self {
        use SliceAxis::{Column, Level, Row};
        match direction {
            Direction::BottomToTop => Self {
                slice: AxisWalk::forward(Level),
                row: AxisWalk::forward(Row),
                col: AxisWalk::forward(Column),
            },
            Direction::TopToBottom => Self {
                slice: AxisWalk::backward(Level),
                row: AxisWalk::forward(Row),
                col: AxisWalk::forward(Column),
            },
            Direction::WestToEast => Self {
                slice: AxisWalk::forward(Column),
                row: AxisWalk::backward(Level),
                col: AxisWalk::backward(Row),
            },
            Direction::EastToWest => Self {
                slice: AxisWalk::backward(Column),
                row: AxisWalk::backward(Level),
                col: AxisWalk::backward(Row),
            },
            Direction::NorthToSouth => Self {
                slice: AxisWalk::forward(Row),
                row: AxisWalk::backward(Level),
                col: AxisWalk::forward(Column),
            },
            Direction::SouthToNorth => Self {
                slice: AxisWalk::backward(Row),
                row: AxisWalk::backward(Level),
                col: AxisWalk::forward(Column),
            },
        }
    }

    /// Stack layout `(slices, rows, cols)` for a grid of `shape`.
    #[must_use]
    pub fn dims(&self, shape: GridShape) -> (usize, usize, usize) {
        (
            self.slice.len(shape),
            self.row.len(shape),
            self.col.len(shape),
        )
    }

    /// Grid position visited at stack position `(slice, row, col)`.
    #[inline]
    #[must_use]
    pub fn grid_point(&self, shape: GridShape, slice: usize, row: usize, col: usize) -> GridPoint {
        let mut point = GridPoint {
            row: 0,
            col: 0,
            level: 0,
        };
        for (walk, step) in [(self.slice, slice), (self.row, row), (self.col, col)] {
            let index = walk.index(step, walk.len(shape));
            match walk.axis {
                SliceAxis::Row => point.row = index,
                SliceAxis::Column => point.col = index,
                SliceAxis::Level => point.level = index,
            }
        }
        point
    }

    /// Iterates every grid position in stack order.
    pub fn points(&self, shape: GridShape) -> impl Iterator<Item = GridPoint> + '_ {
        let (slices, rows, cols) = self.dims(shape);
        (0..slices).flat_map(move |s| {
            (0..rows).flat_map(move |r| {
                (0..cols).map(move |c| self.grid_point(shape, s, r, c))
            })
        })
    }
}
