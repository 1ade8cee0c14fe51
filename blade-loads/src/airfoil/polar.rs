//! Lift/drag/moment polars and the characteristics derived from them

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{BladeError, BladeResult};
use crate::math::{gradient, least_squares, round_to, savgol_filter, FitOptions};

/// One converged operating point of the panel method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarRow {
    /// Angle of attack in degrees
    pub alpha: f64,
    pub cl: f64,
    pub cd: f64,
    /// Pressure drag coefficient
    pub cdp: f64,
    pub cm: f64,
    /// Transition location on the upper surface (x/c)
    pub top_xtr: f64,
    /// Transition location on the lower surface (x/c)
    pub bot_xtr: f64,
}

impl PolarRow {
    fn is_finite(&self) -> bool {
        [self.alpha, self.cl, self.cd, self.cdp, self.cm, self.top_xtr, self.bot_xtr]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Polar table sorted by strictly increasing angle of attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    pub rows: Vec<PolarRow>,
    /// Piecewise CL model evaluated at every row
    pub fitted_cl: Vec<f64>,
    /// dCL/dalpha of the fitted curve (per degree)
    pub dcl_dalpha: Vec<f64>,
    /// Savitzky-Golay smoothed CD
    pub filtered_cd: Vec<f64>,
    /// Second derivative of the filtered CD with respect to CL
    pub dcd_dcl2: Vec<f64>,
    /// Fitted parameters `[x0, x1, a3, b1, b3, c2]`
    pub fit_parameters: [f64; 6],
}

/// Airfoil characteristics expected by the vortex-method solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    /// Zero-lift angle of attack in degrees
    pub zero_lift_alpha: f64,
    /// Lift curve slope dCL/dalpha (per radian)
    pub lift_slope: f64,
    pub cl_max: f64,
    pub cl_min: f64,
    pub cd_min: f64,
    pub cl_at_cd_min: f64,
    /// Curvature of the drag bucket d(CD)/d(CL²)
    pub dcd_dcl2: f64,
    pub cm: f64,
}

/// Piecewise CL(alpha) model.
///
/// Linear below `x0`, linear between `x0` and `x1`, quadratic above `x1`.
/// The remaining coefficients follow from value continuity at `x0` and
/// value and slope continuity at `x1`.
pub fn piecewise_cl(alpha: f64, p: &[f64]) -> f64 {
    let (x0, x1, a3, b1, b3, c2) = (p[0], p[1], p[2], p[3], p[4], p[5]);
    let b2 = 2.0 * a3 * x1 + b3;
    let c1 = b2 * x0 - b1 * x0 + c2;
    let c3 = b2 * x1 + c2 - a3 * x1.powi(2) - b3 * x1;

    if alpha < x0 {
        b1 * alpha + c1
    } else if alpha < x1 {
        b2 * alpha + c2
    } else {
        a3 * alpha.powi(2) + b3 * alpha + c3
    }
}

impl Polar {
    /// Merge the half sweeps of the panel method into one table.
    ///
    /// Rows are concatenated in sweep order, non-numeric rows dropped, the
    /// result stably sorted by alpha and repeated angles removed keeping the
    /// first occurrence.
    pub fn merge(sweeps: Vec<Vec<PolarRow>>) -> Vec<PolarRow> {
        let mut rows: Vec<PolarRow> = sweeps
            .into_iter()
            .flatten()
            .filter(PolarRow::is_finite)
            .collect();
        rows.sort_by(|a, b| a.alpha.total_cmp(&b.alpha));
        rows.dedup_by(|later, first| later.alpha == first.alpha);
        rows
    }

    /// Fit the lift curve and derive the smoothed drag data
    pub fn from_rows(rows: Vec<PolarRow>) -> BladeResult<Self> {
        if rows.len() < 7 {
            return Err(BladeError::PolarFit(format!(
                "{} converged points are not enough for the lift curve fit",
                rows.len()
            )));
        }

        let alpha: Vec<f64> = rows.iter().map(|r| r.alpha).collect();
        let cl: Vec<f64> = rows.iter().map(|r| r.cl).collect();
        let cd: Vec<f64> = rows.iter().map(|r| r.cd).collect();

        let p = least_squares(piecewise_cl, &alpha, &cl, &initial_guess(&alpha, &cl), FitOptions::default())?;
        let fit_parameters = [p[0], p[1], p[2], p[3], p[4], p[5]];

        let fitted_cl: Vec<f64> = alpha.iter().map(|&a| piecewise_cl(a, &p)).collect();
        let dcl_dalpha: Vec<f64> = gradient(&fitted_cl, &alpha)
            .into_iter()
            .map(|g| round_to(g, 5))
            .collect();
        let filtered_cd = savgol_filter(&cd, 11, 2);
        let dcd_dcl2 = gradient(&gradient(&filtered_cd, &cl), &cl);

        Ok(Self {
            rows,
            fitted_cl,
            dcl_dalpha,
            filtered_cd,
            dcd_dcl2,
            fit_parameters,
        })
    }

    pub fn alpha(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.alpha).collect()
    }

    /// Characteristics for the vortex-method solver
    pub fn characteristics(&self) -> BladeResult<Characteristics> {
        let slope_max = self
            .dcl_dalpha
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !(slope_max > 0.0) {
            return Err(BladeError::PolarFit(format!(
                "fitted lift curve has no positive slope (max {})",
                slope_max
            )));
        }

        let cl_at_zero = piecewise_cl(0.0, &self.fit_parameters);
        let cl_min = self
            .dcl_dalpha
            .iter()
            .zip(self.fitted_cl.iter())
            .filter(|(slope, _)| **slope == slope_max)
            .map(|(_, cl)| *cl)
            .fold(f64::INFINITY, f64::min);

        let i_cd_min = self
            .rows
            .iter()
            .enumerate()
            .fold(0, |best, (i, r)| if r.cd < self.rows[best].cd { i } else { best });

        let c = Characteristics {
            zero_lift_alpha: -cl_at_zero / slope_max,
            lift_slope: slope_max * 180.0 / PI,
            cl_max: self.rows.iter().map(|r| r.cl).fold(f64::NEG_INFINITY, f64::max),
            cl_min,
            cd_min: self.rows[i_cd_min].cd,
            cl_at_cd_min: self.rows[i_cd_min].cl,
            dcd_dcl2: self.dcd_dcl2[i_cd_min],
            cm: self.rows.iter().map(|r| r.cm).fold(f64::INFINITY, f64::min),
        };

        let values = [
            c.zero_lift_alpha,
            c.lift_slope,
            c.cl_max,
            c.cl_min,
            c.cd_min,
            c.cl_at_cd_min,
            c.dcd_dcl2,
            c.cm,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BladeError::PolarFit(format!(
                "non-finite airfoil characteristics {:?}",
                c
            )));
        }
        Ok(c)
    }
}

/// Start point for the lift curve fit from the raw data
fn initial_guess(alpha: &[f64], cl: &[f64]) -> Vec<f64> {
    let lo = alpha[0];
    let hi = alpha[alpha.len() - 1];
    let x0 = lo + 0.15 * (hi - lo);
    let x1 = lo + 0.6 * (hi - lo);

    // straight line through the attached-flow range
    let (mut n, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &c) in alpha.iter().zip(cl.iter()) {
        if a >= x0 && a <= x1 {
            n += 1.0;
            sx += a;
            sy += c;
            sxx += a * a;
            sxy += a * c;
        }
    }
    let denom = n * sxx - sx * sx;
    let (b2, c2) = if n >= 2.0 && denom.abs() > 1e-12 {
        let b2 = (n * sxy - sx * sy) / denom;
        (b2, (sy - b2 * sx) / n)
    } else {
        (0.1, 0.0)
    };

    let a3 = -0.005;
    let b3 = b2 - 2.0 * a3 * x1;
    vec![x0, x1, a3, b2, b3, c2]
}
