//! Holt's additive-trend exponential smoothing.
//!
//! For fixed smoothing weights (α, β) every one-step forecast is an affine
//! function of the initial state (l₀, b₀):
//!
//! ```text
//! ŷ_t = c_t + u_t·l₀ + v_t·b₀
//! ```
//!
//! so the initial state that minimizes the in-sample SSE is a two-column
//! least squares problem. The weights themselves come from a fixed grid.
//! When no fit is possible the linear trend forecast is returned instead, and
//! the outcome records why.

use nalgebra::{DMatrix, DVector};
use tracing::info;

use crate::domain::ForecastPoint;
use crate::forecast::TimeSeries;
use crate::forecast::linear::linear_regression_forecast;
use crate::math::ols::solve_least_squares;

/// Fewer observations than this and the fit is not attempted.
pub const MIN_SMOOTHING_POINTS: usize = 5;

const GRID_STEPS: u32 = 19;
const GRID_STEP: f64 = 0.05;

/// Fitted smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltFit {
    pub alpha: f64,
    pub beta: f64,
    pub level0: f64,
    pub trend0: f64,
    /// In-sample sum of squared one-step errors.
    pub sse: f64,
    /// Level and trend after the last observation.
    pub level: f64,
    pub trend: f64,
}

impl HoltFit {
    pub fn forecast(&self, steps_ahead: usize) -> f64 {
        self.level + steps_ahead as f64 * self.trend
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmoothingFailure {
    #[error("need at least {min} points, got {0}", min = MIN_SMOOTHING_POINTS)]
    TooFewPoints(usize),
    #[error("initial state could not be solved")]
    SolveFailed,
    #[error("fit produced non-finite values")]
    NonFinite,
}

/// Which path produced an exponential-smoothing forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothingOutcome {
    Fitted { fit: HoltFit, points: Vec<ForecastPoint> },
    FellBack { reason: SmoothingFailure, points: Vec<ForecastPoint> },
}

impl SmoothingOutcome {
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            SmoothingOutcome::Fitted { points, .. }
            | SmoothingOutcome::FellBack { points, .. } => points,
        }
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        match self {
            SmoothingOutcome::Fitted { points, .. }
            | SmoothingOutcome::FellBack { points, .. } => points,
        }
    }

    pub fn fallback_reason(&self) -> Option<&SmoothingFailure> {
        match self {
            SmoothingOutcome::FellBack { reason, .. } => Some(reason),
            SmoothingOutcome::Fitted { .. } => None,
        }
    }
}

/// Forecast with Holt smoothing, falling back to the linear trend.
///
/// Never fails: every failure mode is reported through the outcome.
pub fn exponential_smoothing_forecast(series: &TimeSeries, horizon: usize) -> SmoothingOutcome {
    let values: Vec<f64> = series.values().collect();
    let fitted = fit_holt(&values).and_then(|fit| {
        let predicted: Vec<(i32, f64)> = series
            .future_years(horizon)
            .enumerate()
            .map(|(i, year)| (year, fit.forecast(i + 1)))
            .collect();
        if predicted.iter().all(|(_, v)| v.is_finite()) {
            Ok((fit, predicted))
        } else {
            Err(SmoothingFailure::NonFinite)
        }
    });

    match fitted {
        Ok((fit, predicted)) => SmoothingOutcome::Fitted {
            fit,
            points: series.with_forecast(predicted),
        },
        Err(reason) => {
            info!(
                country = %series.country,
                indicator = series.indicator.key(),
                %reason,
                "exponential smoothing fell back to linear regression"
            );
            SmoothingOutcome::FellBack {
                reason,
                points: linear_regression_forecast(series, horizon),
            }
        }
    }
}

/// Grid-search (α, β) and solve the initial state for each pair.
pub fn fit_holt(values: &[f64]) -> Result<HoltFit, SmoothingFailure> {
    if values.len() < MIN_SMOOTHING_POINTS {
        return Err(SmoothingFailure::TooFewPoints(values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SmoothingFailure::NonFinite);
    }

    let grid: Vec<f64> = (1..=GRID_STEPS).map(|i| f64::from(i) * GRID_STEP).collect();
    let mut best: Option<HoltFit> = None;
    let mut any_solved = false;

    for &alpha in &grid {
        for &beta in &grid {
            let Some(fit) = fit_with_weights(values, alpha, beta) else {
                continue;
            };
            any_solved = true;
            if !fit.sse.is_finite() || !fit.level.is_finite() || !fit.trend.is_finite() {
                continue;
            }
            if best.is_none_or(|b| fit.sse < b.sse) {
                best = Some(fit);
            }
        }
    }

    match best {
        Some(fit) => Ok(fit),
        None if any_solved => Err(SmoothingFailure::NonFinite),
        None => Err(SmoothingFailure::SolveFailed),
    }
}

/// Affine form `c + u·l₀ + v·b₀`.
#[derive(Debug, Clone, Copy)]
struct Affine {
    c: f64,
    u: f64,
    v: f64,
}

impl Affine {
    fn eval(self, l0: f64, b0: f64) -> f64 {
        self.c + self.u * l0 + self.v * b0
    }

    fn add(self, o: Affine) -> Affine {
        Affine {
            c: self.c + o.c,
            u: self.u + o.u,
            v: self.v + o.v,
        }
    }

    fn sub(self, o: Affine) -> Affine {
        self.add(o.scale(-1.0))
    }

    fn scale(self, k: f64) -> Affine {
        Affine {
            c: self.c * k,
            u: self.u * k,
            v: self.v * k,
        }
    }
}

fn fit_with_weights(values: &[f64], alpha: f64, beta: f64) -> Option<HoltFit> {
    let n = values.len();
    let mut level = Affine { c: 0.0, u: 1.0, v: 0.0 };
    let mut trend = Affine { c: 0.0, u: 0.0, v: 1.0 };
    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut target = DVector::<f64>::zeros(n);

    for (t, &y) in values.iter().enumerate() {
        let one_step = level.add(trend);
        design[(t, 0)] = one_step.u;
        design[(t, 1)] = one_step.v;
        target[t] = y - one_step.c;

        let new_level = one_step.scale(1.0 - alpha).add(Affine { c: alpha * y, u: 0.0, v: 0.0 });
        trend = new_level.sub(level).scale(beta).add(trend.scale(1.0 - beta));
        level = new_level;
    }

    let state = solve_least_squares(&design, &target)?;
    let (l0, b0) = (state[0], state[1]);
    let residuals = &target - &design * &state;

    Some(HoltFit {
        alpha,
        beta,
        level0: l0,
        trend0: b0,
        sse: residuals.norm_squared(),
        level: level.eval(l0, b0),
        trend: trend.eval(l0, b0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, PointKind};

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries {
            country: "A".into(),
            indicator: Indicator::LifeExpectancy,
            points: values.iter().enumerate().map(|(i, &v)| (2000 + i as i32, v)).collect(),
        }
    }

    #[test]
    fn exact_linear_trend_is_reproduced() {
        let values: Vec<f64> = (0..10).map(|i| 50.0 + 0.5 * f64::from(i)).collect();
        let fit = fit_holt(&values).unwrap();
        assert!(fit.sse < 1e-12);
        assert!((fit.forecast(1) - 55.0).abs() < 1e-6);
        assert!((fit.forecast(3) - 56.0).abs() < 1e-6);
    }

    #[test]
    fn constant_series_fits_with_flat_forecast() {
        let outcome = exponential_smoothing_forecast(&series(&[5.0; 5]), 3);
        let forecast: Vec<_> = outcome
            .points()
            .iter()
            .filter(|p| p.kind == PointKind::Forecast)
            .collect();
        assert_eq!(forecast.len(), 3);
        assert!(forecast.iter().all(|p| (p.value - 5.0).abs() < 1e-6));
    }

    #[test]
    fn short_series_falls_back_to_linear() {
        let s = series(&[1.0, 2.0, 3.0]);
        let outcome = exponential_smoothing_forecast(&s, 2);
        assert_eq!(outcome.fallback_reason(), Some(&SmoothingFailure::TooFewPoints(3)));
        assert_eq!(outcome.into_points(), linear_regression_forecast(&s, 2));
    }

    #[test]
    fn non_finite_input_falls_back() {
        let outcome = exponential_smoothing_forecast(&series(&[1.0, 2.0, f64::NAN, 4.0, 5.0]), 1);
        assert_eq!(outcome.fallback_reason(), Some(&SmoothingFailure::NonFinite));
    }
}
