//! Read-only queries over loaded feature tables.
//!
//! Every function here takes the shared tables by reference and returns owned
//! results, so callers can hold on to them while the cache is reloaded.

pub mod correlation;
pub mod filter;
pub mod kpi;

use std::cmp::Ordering;

use crate::domain::{FeatureRecord, FeatureTables, ForecastMethod, Indicator};
use crate::forecast::{ForecastError, ForecastResult, run_forecast};

pub use correlation::{
    CorrelationMatrix, Relationship, Strength, correlation_matrix, correlations, pearson,
};
pub use filter::{RowFilter, available_countries, available_years, filter_rows, filter_world};
pub use kpi::{Aggregation, Delta, Kpi, KpiSummary, compute_kpis, previous_year_for};

/// Snapshot rows for `countries`, highest GDP per capita first.
///
/// An empty country list compares every country in the snapshot.
pub fn compare_countries(tables: &FeatureTables, countries: &[String]) -> Vec<FeatureRecord> {
    let filter = RowFilter::new(countries.to_vec(), None);
    let mut rows: Vec<FeatureRecord> = tables
        .latest_snapshot
        .iter()
        .filter(|r| filter.matches_country(r.country()))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        match (a.value(Indicator::GdpPerCapita), b.value(Indicator::GdpPerCapita)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.country().cmp(b.country()))
    });
    rows
}

/// Forecast one country's indicator from the main table.
pub fn forecast_for(
    tables: &FeatureTables,
    country: &str,
    indicator: Indicator,
    method: ForecastMethod,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    run_forecast(&tables.main_data, country, indicator, method, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;

    #[test]
    fn compare_orders_by_gdp_with_missing_last() {
        let snap = |c: &str, gdp: Option<f64>| {
            let mut base = IndicatorRecord::new(c, None, 2020);
            base.gdp_pc_usd = gdp;
            FeatureRecord::from_base(base)
        };
        let tables = FeatureTables {
            main_data: Vec::new(),
            latest_snapshot: vec![
                snap("A", Some(10.0)),
                snap("B", None),
                snap("C", Some(30.0)),
                snap("D", Some(5.0)),
            ],
            world_aggregates: Vec::new(),
            rolling_window: 3,
        };

        let out = compare_countries(&tables, &["A".into(), "B".into(), "C".into()]);
        let names: Vec<_> = out.iter().map(|r| r.country()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn forecast_for_unknown_country_is_insufficient_data() {
        let tables = FeatureTables {
            main_data: Vec::new(),
            latest_snapshot: Vec::new(),
            world_aggregates: Vec::new(),
            rolling_window: 3,
        };
        let err = forecast_for(&tables, "Nowhere", Indicator::Population, ForecastMethod::Linear, 5)
            .unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { actual: 0, .. }));
    }
}
