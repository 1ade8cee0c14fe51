//! Numerical utilities for load mapping

pub mod fit;
pub mod interp;
pub mod savgol;

use nalgebra::{DMatrix, DVector, Vector3};

pub use fit::{least_squares, FitOptions};
pub use interp::{chord_grid, interp1, Samples, CHORD_GRID_LEN};
pub use savgol::savgol_filter;

pub type Mat = DMatrix<f64>;
pub type DVec = DVector<f64>;
pub type Vec3 = Vector3<f64>;

/// Gradient of `f` sampled at (possibly non-uniform) `x`.
///
/// Second order accurate central differences in the interior, first order
/// one-sided differences at both ends. Fewer than two samples give zeros.
pub fn gradient(f: &[f64], x: &[f64]) -> Vec<f64> {
    let n = f.len().min(x.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut g = vec![0.0; n];
    g[0] = (f[1] - f[0]) / (x[1] - x[0]);
    g[n - 1] = (f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        g[i] = (hd.powi(2) * f[i + 1] + (hs.powi(2) - hd.powi(2)) * f[i] - hs.powi(2) * f[i - 1])
            / (hs * hd * (hd + hs));
    }
    g
}

/// Round to a fixed number of decimal digits
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Round to a number of significant digits
pub fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    round_to(value, digits - 1 - magnitude)
}

/// Least squares polynomial coefficients (lowest order first)
pub(crate) fn polyfit(t: &[f64], y: &[f64], order: usize) -> Option<DVec> {
    let a = Mat::from_fn(t.len(), order + 1, |r, c| t[r].powi(c as i32));
    let b = DVec::from_column_slice(y);
    let ata = a.transpose() * &a;
    let atb = a.transpose() * b;
    ata.cholesky().map(|chol| chol.solve(&atb))
}

pub(crate) fn polyval(coefficients: &DVec, t: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * t + c)
}
