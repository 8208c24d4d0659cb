//! Slice geometry construction.

use volscope_core::{Direction, Extent, GridShape, GridSource, Quantizer, Result, VolscopeError};

use super::{Sampler, Traversal, Volume};

/// World-space placement of a slice stack.
#[derive(Debug, Clone, Copy)]
pub struct SliceFrame<'a> {
    /// Horizontal extent spanned by the grid's columns and rows.
    pub extent: Extent,
    /// World height of every level of the grid being built on.
    pub heights: &'a [f32],
    /// Fraction of one grid spacing by which the stack is shifted toward the viewer.
    pub jitter: f32,
}

/// Depth jitter for layer `layer` of `layer_count` simultaneously displayed volumes.
///
/// The first layer is not shifted; later layers move up to `max_jitter` of a
/// grid spacing so coincident slices of different variables stay apart.
#[must_use]
pub fn jitter_fraction(layer: usize, layer_count: usize, max_jitter: f32) -> f32 {
    if layer_count == 0 {
        return 0.0;
    }
    layer as f32 / layer_count as f32 * max_jitter
}

/// World heights of `levels` consecutive levels starting at `low_level`.
pub fn level_heights<S: GridSource + ?Sized>(
    source: &S,
    time: usize,
    variable: usize,
    levels: usize,
    low_level: i32,
) -> Vec<f32> {
    (0..levels)
        .map(|level| {
            source.level_to_height(time, variable, (level as i32 + low_level) as f32)
        })
        .collect()
}

/// Fills `volume` with the slice stack of a grid of `shape` seen in `direction`.
///
/// Every grid point becomes one vertex; `sampler` supplies its value and
/// `quantizer` its color-table index. The stack is ordered far to near.
pub fn build_slices<S: Sampler + ?Sized>(
    volume: &mut Volume,
    direction: Direction,
    shape: GridShape,
    frame: &SliceFrame<'_>,
    sampler: &S,
    quantizer: &Quantizer,
) -> Result<()> {
    if frame.heights.len() < shape.levels {
        return Err(VolscopeError::SizeMismatch {
            expected: shape.levels,
            actual: frame.heights.len(),
        });
    }
    volume.ensure_capacity(shape)?;

    let extent = frame.extent;
    let spacing = |lo: f32, hi: f32, n: usize| if n > 1 { (hi - lo) / (n - 1) as f32 } else { 0.0 };
    let dx = spacing(extent.x_min, extent.x_max, shape.cols);
    let dy = spacing(extent.y_min, extent.y_max, shape.rows);

    let zs = shifted_heights(&frame.heights[..shape.levels], direction, frame.jitter);
    let (x_shift, y_shift) = match direction {
        Direction::WestToEast => (dx * frame.jitter, 0.0),
        Direction::EastToWest => (-dx * frame.jitter, 0.0),
        Direction::NorthToSouth => (0.0, -dy * frame.jitter),
        Direction::SouthToNorth => (0.0, dy * frame.jitter),
        Direction::BottomToTop | Direction::TopToBottom => (0.0, 0.0),
    };

    let traversal = Traversal::for_direction(direction);
    let (slices, rows, cols) = traversal.dims(shape);
    volume.begin_build(direction, slices, rows, cols);

    for s in 0..slices {
        for r in 0..rows {
            for c in 0..cols {
                let p = traversal.grid_point(shape, s, r, c);
                let position = [
                    extent.x_min + p.col as f32 * dx + x_shift,
                    extent.y_max - p.row as f32 * dy + y_shift,
                    zs[p.level],
                ];
                let index = quantizer.index(sampler.sample(p.row, p.col, p.level));
                volume.push(position, index);
            }
        }
    }

    volume.finish_build();
    log::debug!(
        "built {} slices of {}x{} for variable {} ({direction})",
        slices,
        rows,
        cols,
        volume.variable()
    );
    Ok(())
}

/// Level heights, shifted along Z by the jitter when slicing horizontally.
///
/// The shift uses the local level spacing; the bottom level extrapolates the
/// spacing of the level above it.
fn shifted_heights(heights: &[f32], direction: Direction, jitter: f32) -> Vec<f32> {
    let sign = match direction {
        Direction::BottomToTop => 1.0,
        Direction::TopToBottom => -1.0,
        _ => return heights.to_vec(),
    };
    (0..heights.len())
        .map(|l| {
            let dz = match l {
                0 if heights.len() > 1 => heights[1] - heights[0],
                0 => 0.0,
                _ => heights[l] - heights[l - 1],
            };
            heights[l] + sign * dz * jitter
        })
        .collect()
}
