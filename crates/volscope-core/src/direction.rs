//! Axis-aligned slicing directions.

use serde::{Deserialize, Serialize};

use crate::grid::GridShape;

/// Grid axis that a slice stack steps along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceAxis {
    /// Grid rows (south/north, world Y).
    Row,
    /// Grid columns (west/east, world X).
    Column,
    /// Grid levels (vertical, world Z).
    Level,
}

/// Direction in which slices are produced.
///
/// Every direction orders its slices from the far side of the volume to the
/// near side, so drawing them in order composites back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Horizontal slices, lowest level first.
    BottomToTop,
    /// Horizontal slices, highest level first.
    TopToBottom,
    /// Vertical north-south slices, westernmost column first.
    WestToEast,
    /// Vertical north-south slices, easternmost column first.
    EastToWest,
    /// Vertical west-east slices, northernmost row first.
    NorthToSouth,
    /// Vertical west-east slices, southernmost row first.
    SouthToNorth,
}

impl Direction {
    /// All six directions.
    pub const ALL: [Direction; 6] = [
        Direction::BottomToTop,
        Direction::TopToBottom,
        Direction::WestToEast,
        Direction::EastToWest,
        Direction::NorthToSouth,
        Direction::SouthToNorth,
    ];

    /// Returns the grid axis this direction slices along.
    #[must_use]
    pub fn axis(self) -> SliceAxis {
        match self {
            Direction::BottomToTop | Direction::TopToBottom => SliceAxis::Level,
            Direction::WestToEast | Direction::EastToWest => SliceAxis::Column,
            Direction::NorthToSouth | Direction::SouthToNorth => SliceAxis::Row,
        }
    }

    /// Number of slices a grid of the given shape yields in this direction.
    #[must_use]
    pub fn slice_count(self, shape: GridShape) -> usize {
        match self.axis() {
            SliceAxis::Level => shape.levels,
            SliceAxis::Column => shape.cols,
            SliceAxis::Row => shape.rows,
        }
    }

    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Direction::BottomToTop => "bottom-to-top",
            Direction::TopToBottom => "top-to-bottom",
            Direction::WestToEast => "west-to-east",
            Direction::EastToWest => "east-to-west",
            Direction::NorthToSouth => "north-to-south",
            Direction::SouthToNorth => "south-to-north",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
