//! Straight-line trend forecast.

use crate::domain::ForecastPoint;
use crate::forecast::TimeSeries;
use crate::math::ols::fit_line;

/// Fit `value ~ year` by OLS and extend it `horizon` years past the last observation.
///
/// A series the line cannot be fitted to (a single point) is extended flat at its mean.
pub fn linear_regression_forecast(series: &TimeSeries, horizon: usize) -> Vec<ForecastPoint> {
    let xs: Vec<f64> = series.years().map(f64::from).collect();
    let ys: Vec<f64> = series.values().collect();

    let predict: Box<dyn Fn(f64) -> f64> = match fit_line(&xs, &ys) {
        Some(line) => Box::new(move |x| line.predict(x)),
        None => {
            let mean = if ys.is_empty() { 0.0 } else { ys.iter().sum::<f64>() / ys.len() as f64 };
            Box::new(move |_| mean)
        }
    };

    let predicted = series
        .future_years(horizon)
        .map(|year| (year, predict(f64::from(year))))
        .collect::<Vec<_>>();
    series.with_forecast(predicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, PointKind};

    fn series(points: Vec<(i32, f64)>) -> TimeSeries {
        TimeSeries {
            country: "A".into(),
            indicator: Indicator::GdpPerCapita,
            points,
        }
    }

    #[test]
    fn extends_exact_line() {
        let s = series((2010..2020).map(|y| (y, 2.0 * f64::from(y - 2010) + 1.0)).collect());
        let out = linear_regression_forecast(&s, 5);

        assert_eq!(out.len(), 15);
        let forecast: Vec<_> = out.iter().filter(|p| p.kind == PointKind::Forecast).collect();
        let years: Vec<i32> = forecast.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
        assert!((forecast[0].value - 21.0).abs() < 1e-6);
        assert!((forecast[4].value - 29.0).abs() < 1e-6);
    }

    #[test]
    fn single_point_is_extended_flat() {
        let out = linear_regression_forecast(&series(vec![(2000, 3.0)]), 2);
        assert_eq!(out[1].value, 3.0);
        assert_eq!(out[2].year, 2002);
    }
}
