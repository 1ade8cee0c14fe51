//! Airfoil coordinate polylines

use serde::{Deserialize, Serialize};

use crate::error::{BladeError, BladeResult};
use crate::math::Samples;

/// Closed 2-D airfoil contour, ordered trailing edge → upper surface →
/// leading edge → lower surface → trailing edge, chord normalized to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirfoilShape {
    pub points: Vec<[f64; 2]>,
}

impl AirfoilShape {
    pub fn new(points: Vec<[f64; 2]>) -> BladeResult<Self> {
        if points.len() < 3 {
            return Err(BladeError::InvalidInput(format!(
                "airfoil contour needs at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Parse a coordinate file: an optional name line followed by `x y` rows.
    ///
    /// Lines that do not start with two numbers are skipped.
    pub fn parse(text: &str) -> BladeResult<Self> {
        let points = text
            .lines()
            .filter_map(|line| {
                let mut it = line.split_whitespace().map(str::parse::<f64>);
                match (it.next(), it.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => Some([x, y]),
                    _ => None,
                }
            })
            .collect();
        Self::new(points)
    }

    /// Coordinate file text in the same format [`AirfoilShape::parse`] reads
    pub fn to_dat(&self, name: &str) -> String {
        let mut out = format!("{}\n", name);
        for [x, y] in &self.points {
            out.push_str(&format!("{:10.6} {:10.6}\n", x, y));
        }
        out
    }

    /// Index of the leading edge (first point of minimum x)
    pub fn leading_edge_index(&self) -> usize {
        self.points
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(best, xmin), (i, p)| {
                if p[0] < xmin {
                    (i, p[0])
                } else {
                    (best, xmin)
                }
            })
            .0
    }

    /// Upper surface from the trailing edge up to (excluding) the leading edge
    pub fn upper_surface(&self) -> &[[f64; 2]] {
        &self.points[..self.leading_edge_index()]
    }

    /// Ordinate of the upper surface at chord position `x`, linearly
    /// interpolated between contour points (clamped at the ends).
    pub fn upper_ordinate(&self, x: f64) -> BladeResult<f64> {
        let samples = Samples::new(self.upper_surface().iter().map(|p| (p[0], p[1])))?;
        Ok(samples.at(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DIAMOND: &str = "diamond\n 1.0 0.0\n 0.5 0.1\n 0.0 0.0\n 0.5 -0.1\n 1.0 0.0\n";

    #[test]
    fn test_parse_skips_header() {
        let shape = AirfoilShape::parse(DIAMOND).unwrap();
        assert_eq!(shape.points.len(), 5);
        assert_eq!(shape.leading_edge_index(), 2);
        assert_eq!(shape.upper_surface().len(), 2);
    }

    #[test]
    fn test_upper_ordinate() {
        let shape = AirfoilShape::parse(DIAMOND).unwrap();
        assert_relative_eq!(shape.upper_ordinate(0.75).unwrap(), 0.05);
        assert_relative_eq!(shape.upper_ordinate(0.5).unwrap(), 0.1);
        // the leading edge is not part of the upper surface: clamp to x = 0.5
        assert_relative_eq!(shape.upper_ordinate(0.25).unwrap(), 0.1);
    }

    #[test]
    fn test_round_trip_dat() {
        let shape = AirfoilShape::parse(DIAMOND).unwrap();
        let again = AirfoilShape::parse(&shape.to_dat("diamond")).unwrap();
        assert_eq!(shape, again);
    }
}
