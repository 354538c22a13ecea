//! Least squares helpers.
//!
//! Two small problems are solved here, both with SVD so that tall
//! (more rows than columns) systems work:
//!
//! - the trend line used by the linear forecast
//! - the initial level/trend of Holt smoothing, which is linear in the
//!   one-step forecasts once the smoothing weights are fixed
//!
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares line through `(xs[i], ys[i])`.
///
/// `x` is centered before solving so that calendar years do not dominate the
/// conditioning; the returned intercept is in the original coordinates.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len();
    let x_mean = xs.iter().sum::<f64>() / n as f64;

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { xs[r] - x_mean });
    let y = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&design, &y)?;

    let slope = beta[1];
    Some(LineFit {
        intercept: beta[0] - slope * x_mean,
        slope,
    })
}
