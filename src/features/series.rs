//! Per-country series features: rolling mean and year-over-year change.
//!
//! Both functions expect rows sorted by (country, year).

use crate::domain::{FeatureRecord, Indicator};

/// Trailing mean of income growth over the last `window` rows of each country.
///
/// Null values are skipped; a window with at least one value is defined.
pub fn compute_rolling_averages(rows: &mut [FeatureRecord], window: usize) {
    let window = window.max(1);
    for group in rows.chunk_by_mut(|a, b| a.base.country == b.base.country) {
        let values: Vec<Option<f64>> =
            group.iter().map(|r| r.value(Indicator::IncomeGrowth)).collect();
        for (i, row) in group.iter_mut().enumerate() {
            let start = (i + 1).saturating_sub(window);
            row.income_growth_rolling = trailing_mean(&values[start..=i]);
        }
    }
}

fn trailing_mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Percentage change from the previous row of the same country.
pub fn calculate_year_over_year_changes(rows: &mut [FeatureRecord]) {
    for group in rows.chunk_by_mut(|a, b| a.base.country == b.base.country) {
        for indicator in Indicator::YOY {
            let mut prev: Option<Option<f64>> = None;
            for row in group.iter_mut() {
                let current = row.value(indicator);
                let change = prev.flatten().and_then(|p| pct_change(p, current?));
                row.set_yoy(indicator, change);
                prev = Some(current);
            }
        }
    }
}

/// `(current - previous) / previous * 100`, undefined for a zero base.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let change = (current - previous) / previous * 100.0;
    change.is_finite().then_some(change)
}
