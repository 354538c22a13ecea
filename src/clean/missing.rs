//! Gap filling for per-country indicator series.
//!
//! Every strategy works on one country at a time with its rows sorted by
//! year, so a fill value can never cross a country boundary. Interpolation is
//! linear in row position, not in calendar years.

use tracing::debug;

use crate::domain::{Indicator, IndicatorRecord, MissingStrategy};

/// Fill gaps in place. Records are left sorted by (country, year).
pub fn handle_missing_values(records: &mut [IndicatorRecord], strategy: MissingStrategy) {
    sort_by_country_year(records);
    if strategy == MissingStrategy::LeaveGaps {
        return;
    }

    let before = count_missing(records);
    for group in records.chunk_by_mut(|a, b| a.country == b.country) {
        for indicator in Indicator::ALL {
            let mut column: Vec<Option<f64>> = group.iter().map(|r| r.value(indicator)).collect();
            match (strategy, indicator) {
                (MissingStrategy::ForwardFill, Indicator::Population) => {
                    interpolate_linear(&mut column, false)
                }
                (MissingStrategy::ForwardFill, _) => forward_then_backward_fill(&mut column),
                (MissingStrategy::Interpolate, _) => interpolate_linear(&mut column, true),
                (MissingStrategy::LeaveGaps, _) => {}
            }
            for (record, value) in group.iter_mut().zip(column) {
                record.set_value(indicator, value);
            }
        }
    }
    debug!(?strategy, before, after = count_missing(records), "filled missing indicator values");
}

pub fn sort_by_country_year(records: &mut [IndicatorRecord]) {
    records.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
}

/// Drop rows where all four indicators are missing.
pub fn drop_empty_rows(records: &mut Vec<IndicatorRecord>) -> usize {
    let before = records.len();
    records.retain(|r| !r.all_indicators_missing());
    before - records.len()
}

fn count_missing(records: &[IndicatorRecord]) -> usize {
    records
        .iter()
        .map(|r| Indicator::ALL.iter().filter(|&&ind| r.value(ind).is_none()).count())
        .sum()
}

/// Carry the last observation forward, then fill any leading gap from the first observation.
pub fn forward_then_backward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match *v {
            Some(x) => last = Some(x),
            None => *v = last,
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        match *v {
            Some(x) => next = Some(x),
            None => *v = next,
        }
    }
}

/// Linear interpolation by position.
///
/// Interior gaps are interpolated between their neighbours and trailing gaps
/// repeat the last observation. Leading gaps are filled with the first
/// observation only when `fill_leading` is set.
pub fn interpolate_linear(values: &mut [Option<f64>], fill_leading: bool) {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|x| (i, x)))
        .collect();
    let (Some(&(first_idx, first_val)), Some(&(last_idx, last_val))) =
        (known.first(), known.last())
    else {
        return;
    };

    for pair in known.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        for (i, slot) in values.iter_mut().enumerate().take(i1).skip(i0 + 1) {
            let t = (i - i0) as f64 / (i1 - i0) as f64;
            *slot = Some(v0 + t * (v1 - v0));
        }
    }
    for slot in values.iter_mut().skip(last_idx + 1) {
        *slot = Some(last_val);
    }
    if fill_leading {
        for slot in values.iter_mut().take(first_idx) {
            *slot = Some(first_val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(country: &str, gdp: &[Option<f64>], pop: &[Option<f64>]) -> Vec<IndicatorRecord> {
        gdp.iter()
            .zip(pop)
            .enumerate()
            .map(|(i, (g, p))| {
                let mut r = IndicatorRecord::new(country, None, 2000 + i as i32);
                r.gdp_pc_usd = *g;
                r.population_total = *p;
                r
            })
            .collect()
    }

    #[test]
    fn ffill_then_bfill() {
        let mut v = vec![None, Some(1.0), None, Some(3.0), None];
        forward_then_backward_fill(&mut v);
        assert_eq!(v, vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn interpolation_fills_interior_and_trailing() {
        let mut v = vec![None, Some(10.0), None, None, Some(40.0), None];
        interpolate_linear(&mut v, false);
        assert_eq!(v, vec![None, Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(40.0)]);

        let mut v = vec![None, Some(10.0), None, Some(30.0)];
        interpolate_linear(&mut v, true);
        assert_eq!(v, vec![Some(10.0), Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn all_missing_column_stays_missing() {
        let mut v = vec![None, None];
        interpolate_linear(&mut v, true);
        forward_then_backward_fill(&mut v);
        assert_eq!(v, vec![None, None]);
    }

    #[test]
    fn fills_never_cross_countries() {
        let mut records = series("B", &[None, Some(5.0)], &[Some(1.0), None]);
        records.extend(series("A", &[Some(100.0), None], &[None, None]));
        handle_missing_values(&mut records, MissingStrategy::ForwardFill);

        assert_eq!(records[0].country, "A");
        assert_eq!(records[1].gdp_pc_usd, Some(100.0));
        assert_eq!(records[0].population_total, None);
        assert_eq!(records[2].country, "B");
        assert_eq!(records[2].gdp_pc_usd, Some(5.0));
        assert_eq!(records[3].population_total, Some(1.0));
    }

    #[test]
    fn forward_fill_leaves_leading_population_gap() {
        let gdp = [Some(1.0), Some(2.0), Some(3.0)];
        let mut records = series("A", &gdp, &[None, Some(10.0), None]);
        handle_missing_values(&mut records, MissingStrategy::ForwardFill);
        let pop: Vec<_> = records.iter().map(|r| r.population_total).collect();
        assert_eq!(pop, vec![None, Some(10.0), Some(10.0)]);

        let mut records = series("A", &gdp, &[None, Some(10.0), None]);
        handle_missing_values(&mut records, MissingStrategy::Interpolate);
        let pop: Vec<_> = records.iter().map(|r| r.population_total).collect();
        assert_eq!(pop, vec![Some(10.0), Some(10.0), Some(10.0)]);
    }

    #[test]
    fn interpolate_fills_both_ends_of_every_column() {
        let mut records = series(
            "A",
            &[None, Some(10.0), None, Some(30.0), None],
            &[Some(5.0), None, None, None, Some(9.0)],
        );
        for (r, life) in records.iter_mut().zip([None, None, Some(70.0), None, None]) {
            r.life_expectancy_years = life;
        }
        records[3].ann_income_pc_growth_pct = Some(-1.5);

        handle_missing_values(&mut records, MissingStrategy::Interpolate);

        let gdp: Vec<_> = records.iter().map(|r| r.gdp_pc_usd).collect();
        assert_eq!(gdp, vec![Some(10.0), Some(10.0), Some(20.0), Some(30.0), Some(30.0)]);
        let pop: Vec<_> = records.iter().map(|r| r.population_total).collect();
        assert_eq!(pop, vec![Some(5.0), Some(6.0), Some(7.0), Some(8.0), Some(9.0)]);
        assert!(records.iter().all(|r| r.life_expectancy_years == Some(70.0)));
        assert!(records.iter().all(|r| r.ann_income_pc_growth_pct == Some(-1.5)));
    }

    #[test]
    fn forward_fill_is_idempotent() {
        let mut records = series(
            "A",
            &[None, Some(2.0), None, Some(4.0), None],
            &[None, Some(10.0), None, Some(30.0), None],
        );
        records.extend(series("B", &[None, None, Some(7.0)], &[Some(1.0), None, None]));

        handle_missing_values(&mut records, MissingStrategy::ForwardFill);
        let once = records.clone();
        handle_missing_values(&mut records, MissingStrategy::ForwardFill);
        assert_eq!(records, once);
    }

    #[test]
    fn leave_gaps_only_sorts() {
        let mut records = series("B", &[None], &[None]);
        records.extend(series("A", &[None], &[None]));
        handle_missing_values(&mut records, MissingStrategy::LeaveGaps);
        assert_eq!(records[0].country, "A");
        assert_eq!(records[1].gdp_pc_usd, None);
    }

    #[test]
    fn drop_empty_rows_removes_all_null_records() {
        let mut records = series("A", &[None, Some(1.0)], &[None, None]);
        assert_eq!(drop_empty_rows(&mut records), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2001);
    }
}
