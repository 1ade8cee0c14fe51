//! Chordwise pressure and skin-friction distributions

use serde::{Deserialize, Serialize};

use crate::error::{BladeError, BladeResult};
use crate::math::{chord_grid, interp1, Samples};

/// Raw panel-method output around the contour.
///
/// Points follow the contour order (trailing edge, upper surface, leading
/// edge, lower surface, trailing edge) on the solver's non-uniform grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDistribution {
    /// Angle of attack the solver converged to (degrees)
    pub alpha: f64,
    pub x: Vec<f64>,
    pub cp: Vec<f64>,
    /// Skin friction coefficient per point, empty if not available
    pub cf: Vec<f64>,
}

/// Pressure distribution on the fixed 99-point chord grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureDistribution {
    /// Angle of attack the distribution belongs to (degrees)
    pub alpha: f64,
    /// Chord grid `0.01..=0.99`
    pub x: Vec<f64>,
    pub cp_suc: Vec<f64>,
    pub cp_pres: Vec<f64>,
    pub cf_suc: Vec<f64>,
    pub cf_pres: Vec<f64>,
}

/// Distribution values at one chord position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChordSample {
    pub cp_suc: f64,
    pub cp_pres: f64,
    /// Skin friction of both surfaces combined
    pub cf: f64,
}

impl PressureDistribution {
    /// Normalize a raw distribution onto the chord grid.
    ///
    /// The contour is split at its minimum x: the suction side runs up to and
    /// including that point, the pressure side starts right after it.
    pub fn from_surface(raw: &SurfaceDistribution) -> BladeResult<Self> {
        let n = raw.x.len();
        if n < 3 || raw.cp.len() != n {
            return Err(BladeError::InvalidInput(format!(
                "pressure distribution needs matching x/Cp columns with at least 3 points (x: {}, Cp: {})",
                n,
                raw.cp.len()
            )));
        }
        let cf = if raw.cf.len() == n {
            raw.cf.clone()
        } else {
            vec![0.0; n]
        };

        let imin = raw
            .x
            .iter()
            .enumerate()
            .fold(0, |best, (i, &x)| if x < raw.x[best] { i } else { best });
        if imin + 1 >= n {
            return Err(BladeError::InvalidInput(
                "pressure distribution has no pressure side".to_string(),
            ));
        }

        let grid = chord_grid();
        let side = |range: std::ops::Range<usize>, values: &[f64]| -> BladeResult<Vec<f64>> {
            let samples = Samples::new(range.map(|i| (raw.x[i], values[i])))?;
            Ok(samples.resample(&grid))
        };

        Ok(Self {
            alpha: raw.alpha,
            cp_suc: side(0..imin + 1, &raw.cp)?,
            cp_pres: side(imin + 1..n, &raw.cp)?,
            cf_suc: side(0..imin + 1, &cf)?,
            cf_pres: side(imin + 1..n, &cf)?,
            x: grid,
        })
    }

    /// Linear blend `self * (1 - fraction) + other * fraction`
    pub fn blend(&self, other: &Self, fraction: f64) -> Self {
        let mix = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter()
                .zip(b.iter())
                .map(|(a, b)| a * (1.0 - fraction) + b * fraction)
                .collect()
        };
        Self {
            alpha: self.alpha * (1.0 - fraction) + other.alpha * fraction,
            x: self.x.clone(),
            cp_suc: mix(&self.cp_suc, &other.cp_suc),
            cp_pres: mix(&self.cp_pres, &other.cp_pres),
            cf_suc: mix(&self.cf_suc, &other.cf_suc),
            cf_pres: mix(&self.cf_pres, &other.cf_pres),
        }
    }

    /// Values at a relative chord position, clamped to the grid ends
    pub fn at(&self, rel_chord: f64) -> ChordSample {
        ChordSample {
            cp_suc: interp1(&self.x, &self.cp_suc, rel_chord),
            cp_pres: interp1(&self.x, &self.cp_pres, rel_chord),
            cf: interp1(&self.x, &self.cf_suc, rel_chord) + interp1(&self.x, &self.cf_pres, rel_chord),
        }
    }
}
