//! Single-series forecasting.
//!
//! - series preparation (`prepare_forecast_data`)
//! - linear trend (`linear`)
//! - Holt smoothing with linear fallback (`holt`)

pub mod holt;
pub mod linear;

use serde::Serialize;
use tracing::debug;

use crate::domain::{FeatureRecord, ForecastMethod, ForecastPoint, Indicator, PointKind};

pub use holt::{
    HoltFit, SmoothingFailure, SmoothingOutcome, exponential_smoothing_forecast, fit_holt,
};
pub use linear::linear_regression_forecast;

pub const DEFAULT_MIN_POINTS: usize = 5;
pub const DEFAULT_HORIZON: usize = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error(
        "Not enough data to forecast {} for '{country}': need {required} points, found {actual}.",
        indicator.label()
    )]
    InsufficientData {
        country: String,
        indicator: Indicator,
        required: usize,
        actual: usize,
    },
}

/// One country's observed values for one indicator, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub country: String,
    pub indicator: Indicator,
    pub points: Vec<(i32, f64)>,
}

impl TimeSeries {
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|&(y, _)| y)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, v)| v)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|&(y, _)| y)
    }

    /// The `horizon` calendar years following the last observation.
    pub fn future_years(&self, horizon: usize) -> impl Iterator<Item = i32> {
        let start = self.last_year().map_or(0, |y| y + 1);
        (0..horizon).map(move |i| start + i as i32)
    }

    /// Historical points followed by the given predictions as forecast points.
    pub fn with_forecast(
        &self,
        predicted: impl IntoIterator<Item = (i32, f64)>,
    ) -> Vec<ForecastPoint> {
        let historical = self.points.iter().map(|&(year, value)| ForecastPoint {
            year,
            value,
            kind: PointKind::Historical,
        });
        let forecast = predicted.into_iter().map(|(year, value)| ForecastPoint {
            year,
            value,
            kind: PointKind::Forecast,
        });
        historical.chain(forecast).collect()
    }

    /// Sample standard deviation of the observed values.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let mean = self.values().sum::<f64>() / n as f64;
        let var = self.values().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(var.sqrt())
    }
}

/// Extract a clean series for one country and indicator.
///
/// Rows with a missing value are skipped. Fewer than `min_points` remaining
/// values (including a country with no rows) is `InsufficientData`.
pub fn prepare_forecast_data(
    rows: &[FeatureRecord],
    country: &str,
    indicator: Indicator,
    min_points: usize,
) -> Result<TimeSeries, ForecastError> {
    let mut points: Vec<(i32, f64)> = rows
        .iter()
        .filter(|r| r.country() == country)
        .filter_map(|r| r.value(indicator).filter(|v| v.is_finite()).map(|v| (r.year(), v)))
        .collect();
    points.sort_by_key(|&(y, _)| y);

    if points.len() < min_points || points.is_empty() {
        return Err(ForecastError::InsufficientData {
            country: country.to_string(),
            indicator,
            required: min_points.max(1),
            actual: points.len(),
        });
    }

    Ok(TimeSeries {
        country: country.to_string(),
        indicator,
        points,
    })
}

/// A finished forecast, ready to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub country: String,
    pub indicator: Indicator,
    pub method: ForecastMethod,
    pub points: Vec<ForecastPoint>,
    /// Set when exponential smoothing could not be fitted.
    pub fallback: Option<String>,
    /// Standard deviation of the historical values, used as a ± band.
    pub band: Option<f64>,
}

impl ForecastResult {
    pub fn historical(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.kind == PointKind::Historical)
    }

    pub fn forecast(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.kind == PointKind::Forecast)
    }
}

/// Prepare the series and run the chosen method.
pub fn run_forecast(
    rows: &[FeatureRecord],
    country: &str,
    indicator: Indicator,
    method: ForecastMethod,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    let series = prepare_forecast_data(rows, country, indicator, DEFAULT_MIN_POINTS)?;
    let (points, fallback) = match method {
        ForecastMethod::Linear => (linear_regression_forecast(&series, horizon), None),
        ForecastMethod::ExpSmoothing => {
            let outcome = exponential_smoothing_forecast(&series, horizon);
            let fallback = outcome.fallback_reason().map(ToString::to_string);
            (outcome.into_points(), fallback)
        }
    };
    debug!(country, indicator = indicator.key(), ?method, horizon, "forecast computed");

    Ok(ForecastResult {
        country: country.to_string(),
        indicator,
        method,
        points,
        fallback,
        band: series.std_dev(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;

    fn rows(country: &str, values: &[Option<f64>]) -> Vec<FeatureRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut base = IndicatorRecord::new(country, None, 2010 + i as i32);
                base.gdp_pc_usd = *v;
                FeatureRecord::from_base(base)
            })
            .collect()
    }

    #[test]
    fn insufficient_data_is_signalled() {
        let data = rows("A", &[Some(1.0), None, Some(2.0), None, Some(3.0)]);
        let err = prepare_forecast_data(&data, "A", Indicator::GdpPerCapita, 5).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                country: "A".into(),
                indicator: Indicator::GdpPerCapita,
                required: 5,
                actual: 3,
            }
        );
    }

    #[test]
    fn unknown_country_is_insufficient_data() {
        let data = rows("A", &[Some(1.0); 6]);
        let err = prepare_forecast_data(&data, "B", Indicator::GdpPerCapita, 5).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { actual: 0, .. }));
    }

    #[test]
    fn both_methods_return_contiguous_horizon() {
        let values: Vec<Option<f64>> = (0..10)
            .map(|i| Some(100.0 + 3.0 * f64::from(i) + f64::from(i % 3)))
            .collect();
        let data = rows("A", &values);

        for method in [ForecastMethod::Linear, ForecastMethod::ExpSmoothing] {
            let result = run_forecast(&data, "A", Indicator::GdpPerCapita, method, 5).unwrap();
            let hist: Vec<_> = result.historical().collect();
            let fc: Vec<_> = result.forecast().collect();

            assert_eq!(hist.len(), 10);
            assert_eq!(fc.len(), 5);
            let years: Vec<i32> = fc.iter().map(|p| p.year).collect();
            assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
            for (p, v) in hist.iter().zip(&values) {
                assert_eq!(Some(p.value), *v);
            }
            // Historical block strictly precedes the forecast block.
            assert!(result.points[..10].iter().all(|p| p.kind == PointKind::Historical));
        }
    }

    #[test]
    fn degenerate_series_matches_linear_shape() {
        let data = rows("A", &[Some(5.0); 5]);
        let run = |method| run_forecast(&data, "A", Indicator::GdpPerCapita, method, 4).unwrap();
        let smooth = run(ForecastMethod::ExpSmoothing);
        let linear = run(ForecastMethod::Linear);

        let shape =
            |r: &ForecastResult| r.points.iter().map(|p| (p.year, p.kind)).collect::<Vec<_>>();
        assert_eq!(shape(&smooth), shape(&linear));
        assert_eq!(smooth.band, Some(0.0));
    }
}
