//! Value lookup strategies for the slice builder.

use glam::Vec3;
use volscope_core::{is_missing, GridShape, Result, VolscopeError, MISSING};

/// Looks up the scalar value at a position of the grid the stack is built on.
///
/// Returns [`MISSING`] where no value is available.
pub trait Sampler {
    fn sample(&self, row: usize, col: usize, level: usize) -> f32;
}

/// Reads values straight from the native array.
#[derive(Debug, Clone, Copy)]
pub struct DirectSampler<'a> {
    data: &'a [f32],
    shape: GridShape,
}

impl<'a> DirectSampler<'a> {
    /// Wraps a native array of the given shape.
    pub fn new(data: &'a [f32], shape: GridShape) -> Result<Self> {
        if data.len() < shape.len() {
            return Err(VolscopeError::SizeMismatch {
                expected: shape.len(),
                actual: data.len(),
            });
        }
        Ok(Self { data, shape })
    }
}

impl Sampler for DirectSampler<'_> {
    #[inline]
    fn sample(&self, row: usize, col: usize, level: usize) -> f32 {
        self.data[self.shape.index(row, col, level)]
    }
}

/// Resamples a native array onto display-grid positions.
///
/// `remap` converts a display-grid position to fractional native coordinates
/// `(row, col, level)`. Positions outside the native grid, and cells touching
/// a missing sample, produce [`MISSING`].
pub struct TrilinearSampler<'a, F> {
    data: &'a [f32],
    native: GridShape,
    remap: F,
}

impl<'a, F> TrilinearSampler<'a, F>
where
    F: Fn(f32, f32, f32) -> Vec3,
{
    /// Wraps a native array of shape `native` with a coordinate remap.
    pub fn new(data: &'a [f32], native: GridShape, remap: F) -> Result<Self> {
        if data.len() < native.len() {
            return Err(VolscopeError::SizeMismatch {
                expected: native.len(),
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            native,
            remap,
        })
    }

    /// Interpolates the native array at fractional coordinates.
    #[allow(clippy::many_single_char_names)]
    pub fn interpolate(&self, grid: Vec3) -> f32 {
        let n = self.native;
        let inside = |v: f32, len: usize| v >= 0.0 && v < len as f32;
        if !(inside(grid.x, n.rows) && inside(grid.y, n.cols) && inside(grid.z, n.levels)) {
            return MISSING;
        }

        // Lower lattice corner, the neighbor clamped to the last index and
        // collapsed onto the corner when the weight is exactly zero.
        let corner = |v: f32, len: usize| {
            let i0 = (v as usize).min(len - 1);
            let frac = v - i0 as f32;
            let i1 = if frac == 0.0 { i0 } else { (i0 + 1).min(len - 1) };
            (i0, i1, frac)
        };
        let (r0, r1, er) = corner(grid.x, n.rows);
        let (c0, c1, ec) = corner(grid.y, n.cols);
        let (l0, l1, el) = corner(grid.z, n.levels);

        let at = |r: usize, c: usize, l: usize| self.data[n.index(r, c, l)];
        let s = [
            at(r0, c0, l0),
            at(r1, c0, l0),
            at(r0, c1, l0),
            at(r1, c1, l0),
            at(r0, c0, l1),
            at(r1, c0, l1),
            at(r0, c1, l1),
            at(r1, c1, l1),
        ];
        if s.iter().any(|&v| is_missing(v)) {
            return MISSING;
        }

        let lerp = |a: f32, b: f32, t: f32| a * (1.0 - t) + b * t;
        let lower = lerp(lerp(s[0], s[1], er), lerp(s[2], s[3], er), ec);
        let upper = lerp(lerp(s[4], s[5], er), lerp(s[6], s[7], er), ec);
        lerp(lower, upper, el)
    }
}

impl<F> Sampler for TrilinearSampler<'_, F>
where
    F: Fn(f32, f32, f32) -> Vec3,
{
    fn sample(&self, row: usize, col: usize, level: usize) -> f32 {
        let grid = (self.remap)(row as f32, col as f32, level as f32);
        self.interpolate(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(shape: GridShape) -> Vec<f32> {
        let mut data = vec![0.0; shape.len()];
        for l in 0..shape.levels {
            for c in 0..shape.cols {
                for r in 0..shape.rows {
                    data[shape.index(r, c, l)] = (r + 10 * c + 100 * l) as f32;
                }
            }
        }
        data
    }

    #[test]
    fn test_direct_reads_layout() {
        let shape = GridShape::new(3, 4, 2);
        let data = ramp(shape);
        let sampler = DirectSampler::new(&data, shape).expect("sized");
        assert_eq!(sampler.sample(2, 3, 1), 132.0);
        assert_eq!(sampler.sample(0, 1, 0), 10.0);
    }

    #[test]
    fn test_direct_rejects_short_array() {
        let err = DirectSampler::new(&[0.0; 5], GridShape::new(2, 2, 2)).unwrap_err();
        assert!(matches!(
            err,
            VolscopeError::SizeMismatch {
                expected: 8,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_identity_remap_matches_direct() {
        let shape = GridShape::new(3, 4, 2);
        let data = ramp(shape);
        let direct = DirectSampler::new(&data, shape).expect("sized");
        let resampled = TrilinearSampler::new(&data, shape, Vec3::new).expect("sized");
        for l in 0..shape.levels {
            for c in 0..shape.cols {
                for r in 0..shape.rows {
                    assert_eq!(resampled.sample(r, c, l), direct.sample(r, c, l));
                }
            }
        }
    }

    #[test]
    fn test_linear_field_is_reproduced() {
        let shape = GridShape::new(3, 4, 2);
        let data = ramp(shape);
        let sampler = TrilinearSampler::new(&data, shape, Vec3::new).expect("sized");
        let value = sampler.interpolate(Vec3::new(1.5, 2.25, 0.5));
        assert!((value - (1.5 + 22.5 + 50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_upper_boundary_does_not_read_past_end() {
        let shape = GridShape::new(3, 4, 2);
        let data = ramp(shape);
        let sampler = TrilinearSampler::new(&data, shape, Vec3::new).expect("sized");
        // Fractional position in the last cell of every axis
        let value = sampler.interpolate(Vec3::new(2.5, 3.5, 1.5));
        assert!((value - 132.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_bounds_is_missing() {
        let shape = GridShape::new(3, 4, 2);
        let data = ramp(shape);
        let sampler = TrilinearSampler::new(&data, shape, Vec3::new).expect("sized");
        assert!(is_missing(sampler.interpolate(Vec3::new(3.0, 0.0, 0.0))));
        assert!(is_missing(sampler.interpolate(Vec3::new(4.0, 0.0, 0.0))));
        assert!(is_missing(sampler.interpolate(Vec3::new(-0.5, 0.0, 0.0))));
        assert!(is_missing(sampler.interpolate(Vec3::new(0.0, 4.0, 0.0))));
        assert!(is_missing(sampler.interpolate(Vec3::new(0.0, 0.0, 2.0))));
        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(is_missing(sampler.interpolate(nan)));
    }

    #[test]
    fn test_missing_corner_propagates() {
        let shape = GridShape::new(2, 2, 2);
        let mut data = vec![1.0; shape.len()];
        data[shape.index(1, 1, 1)] = MISSING;
        let sampler = TrilinearSampler::new(&data, shape, Vec3::new).expect("sized");
        assert!(is_missing(sampler.interpolate(Vec3::new(0.5, 0.5, 0.5))));
        // Exactly on a lattice point the missing neighbor carries no weight
        assert_eq!(sampler.interpolate(Vec3::new(0.0, 0.0, 0.0)), 1.0);
    }
}
