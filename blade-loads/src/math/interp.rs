//! Monotonic 1-D linear interpolation on sorted samples

use crate::error::{BladeError, BladeResult};

/// Number of points on the normalized chord grid
pub const CHORD_GRID_LEN: usize = 99;

/// Normalized chord grid `0.01, 0.02, ..., 0.99`
pub fn chord_grid() -> Vec<f64> {
    (1..=CHORD_GRID_LEN).map(|i| i as f64 / 100.0).collect()
}

/// Linear interpolation of `ys` sampled at strictly ascending `xs`.
///
/// Queries outside the sampled range return the nearest end value. A query
/// that coincides with a sample returns that sample exactly.
pub fn interp1(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    // first sample strictly greater than x, always in 1..n here
    let i = xs[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// A validated set of (x, y) samples sorted by x
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Samples {
    /// Build from unordered points.
    ///
    /// Non-finite points are dropped, the rest is sorted by x (stable) and
    /// repeated abscissae keep their first occurrence.
    pub fn new<I>(points: I) -> BladeResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points: Vec<(f64, f64)> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|later, first| later.0 == first.0);

        if points.is_empty() {
            return Err(BladeError::InvalidInput(
                "interpolation needs at least one finite sample".to_string(),
            ));
        }

        let (xs, ys) = points.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    /// Build from parallel slices
    pub fn from_columns(xs: &[f64], ys: &[f64]) -> BladeResult<Self> {
        if xs.len() != ys.len() {
            return Err(BladeError::InvalidInput(format!(
                "column length mismatch: {} x values, {} y values",
                xs.len(),
                ys.len()
            )));
        }
        Self::new(xs.iter().copied().zip(ys.iter().copied()))
    }

    /// Interpolated value at `x`
    pub fn at(&self, x: f64) -> f64 {
        interp1(&self.xs, &self.ys, x)
    }

    /// Values on a whole grid
    pub fn resample(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&x| self.at(x)).collect()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}
