//! Nonlinear least squares (Levenberg-Marquardt)

use super::{DVec, Mat};
use crate::error::{BladeError, BladeResult};

/// Options for [`least_squares`]
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Maximum number of accepted or rejected steps
    pub max_iterations: usize,
    /// Relative tolerance on the cost and the step size
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-10,
        }
    }
}

/// Fit the parameters of `model(x, p)` to the samples `(xs, ys)`.
///
/// Starts at `p0` and uses a forward difference Jacobian. Returns the
/// optimal parameters or [`BladeError::PolarFit`] if the iteration does not
/// converge.
pub fn least_squares<F>(
    model: F,
    xs: &[f64],
    ys: &[f64],
    p0: &[f64],
    options: FitOptions,
) -> BladeResult<Vec<f64>>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let m = xs.len();
    let n = p0.len();
    if m != ys.len() {
        return Err(BladeError::PolarFit("sample length mismatch".to_string()));
    }
    if m < n {
        return Err(BladeError::PolarFit(format!(
            "{} samples cannot determine {} parameters",
            m, n
        )));
    }

    let residuals = |p: &[f64]| -> DVec { DVec::from_fn(m, |i, _| ys[i] - model(xs[i], p)) };

    let mut p = p0.to_vec();
    let mut r = residuals(&p);
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(BladeError::PolarFit("non-finite residual at start point".to_string()));
    }

    let scale = ys.iter().map(|y| y * y).sum::<f64>().max(f64::MIN_POSITIVE);
    let mut lambda = 1e-3;

    for _ in 0..options.max_iterations {
        // Jacobian of the model (negative residual Jacobian)
        let mut jac = Mat::zeros(m, n);
        for j in 0..n {
            let h = f64::EPSILON.sqrt() * p[j].abs().max(1.0);
            let mut shifted = p.clone();
            shifted[j] += h;
            for i in 0..m {
                jac[(i, j)] = (model(xs[i], &shifted) - model(xs[i], &p)) / h;
            }
        }

        let jtj = jac.transpose() * &jac;
        let g = jac.transpose() * &r;
        if g.amax() <= options.tolerance * options.tolerance {
            return Ok(p);
        }

        let mut damped = jtj.clone();
        for k in 0..n {
            damped[(k, k)] += lambda * jtj[(k, k)].max(1e-12);
        }

        let step = match damped.lu().solve(&g) {
            Some(step) => step,
            None => {
                lambda *= 10.0;
                continue;
            }
        };

        let candidate: Vec<f64> = p.iter().zip(step.iter()).map(|(a, b)| a + b).collect();
        let r_new = residuals(&candidate);
        let cost_new = r_new.norm_squared();

        let p_norm = p.iter().map(|v| v * v).sum::<f64>().sqrt();
        let small_step = step.norm() <= options.tolerance * (p_norm + options.tolerance);

        if cost_new.is_finite() && cost_new < cost {
            let converged = (cost - cost_new) <= options.tolerance * cost
                || small_step
                || cost_new <= f64::EPSILON * scale;
            p = candidate;
            r = r_new;
            cost = cost_new;
            lambda = (lambda / 10.0).max(1e-15);
            if converged {
                return Ok(p);
            }
        } else {
            if small_step {
                return Ok(p);
            }
            lambda *= 10.0;
            if lambda > 1e16 {
                return Err(BladeError::PolarFit(format!(
                    "damping diverged at residual norm {:.3e}",
                    cost.sqrt()
                )));
            }
        }
    }

    Err(BladeError::PolarFit(format!(
        "no convergence within {} iterations",
        options.max_iterations
    )))
}
