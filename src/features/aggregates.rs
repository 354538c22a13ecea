//! Cross-country tables: latest-year snapshot and world aggregates.

use std::collections::BTreeMap;

use crate::domain::{FeatureRecord, Indicator, WorldAggregate};

/// One row per country: the row with that country's maximum year.
///
/// Output is sorted by country.
pub fn create_latest_year_snapshot(rows: &[FeatureRecord]) -> Vec<FeatureRecord> {
    let mut latest: BTreeMap<&str, &FeatureRecord> = BTreeMap::new();
    for row in rows {
        latest
            .entry(row.country())
            .and_modify(|cur| {
                if row.year() > cur.year() {
                    *cur = row;
                }
            })
            .or_insert(row);
    }
    latest.into_values().cloned().collect()
}

#[derive(Default)]
struct WeightedSum {
    weighted: f64,
    weight: f64,
}

impl WeightedSum {
    fn add(&mut self, value: Option<f64>, weight: Option<f64>) {
        if let (Some(v), Some(w)) = (value, weight) {
            self.weighted += v * w;
            self.weight += w;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.weight == 0.0 {
            return None;
        }
        let m = self.weighted / self.weight;
        m.is_finite().then_some(m)
    }
}

#[derive(Default)]
struct YearAccumulator {
    gdp: WeightedSum,
    life: WeightedSum,
    income: WeightedSum,
    population: f64,
}

/// Population-weighted means per year, plus total population.
///
/// A metric's weighted mean only uses rows where both the metric and the
/// population are present; it is `None` when those weights sum to zero.
pub fn compute_world_aggregates(rows: &[FeatureRecord]) -> Vec<WorldAggregate> {
    let mut by_year: BTreeMap<i32, YearAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = by_year.entry(row.year()).or_default();
        let pop = row.value(Indicator::Population);
        acc.gdp.add(row.value(Indicator::GdpPerCapita), pop);
        acc.life.add(row.value(Indicator::LifeExpectancy), pop);
        acc.income.add(row.value(Indicator::IncomeGrowth), pop);
        acc.population += pop.unwrap_or(0.0);
    }

    by_year
        .into_iter()
        .map(|(year, acc)| WorldAggregate {
            year,
            world_gdp_pc_weighted: acc.gdp.mean(),
            world_life_expectancy_weighted: acc.life.mean(),
            world_income_growth_weighted: acc.income.mean(),
            world_population_total: acc.population,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;
    use approx::assert_abs_diff_eq;

    fn row(country: &str, year: i32, gdp: Option<f64>, pop: Option<f64>) -> FeatureRecord {
        let mut base = IndicatorRecord::new(country, None, year);
        base.gdp_pc_usd = gdp;
        base.population_total = pop;
        FeatureRecord::from_base(base)
    }

    #[test]
    fn weighted_gdp_matches_hand_computation() {
        let rows = vec![
            row("A", 2020, Some(100.0), Some(10.0)),
            row("B", 2020, Some(200.0), Some(90.0)),
        ];
        let agg = compute_world_aggregates(&rows);
        assert_eq!(agg.len(), 1);
        assert_abs_diff_eq!(agg[0].world_gdp_pc_weighted.unwrap(), 190.0, epsilon = 1e-9);
        assert_abs_diff_eq!(agg[0].world_population_total, 100.0);
        assert_eq!(agg[0].world_life_expectancy_weighted, None);
    }

    #[test]
    fn zero_population_gives_null_means() {
        let rows = vec![row("A", 2020, Some(100.0), Some(0.0)), row("B", 2020, Some(5.0), None)];
        let agg = compute_world_aggregates(&rows);
        assert_eq!(agg[0].world_gdp_pc_weighted, None);
        assert_eq!(agg[0].world_population_total, 0.0);
    }

    #[test]
    fn snapshot_has_one_row_per_country_at_its_latest_year() {
        let rows = vec![
            row("B", 2018, None, None),
            row("A", 2019, None, None),
            row("A", 2021, Some(1.0), None),
            row("B", 2020, None, None),
        ];
        let snap = create_latest_year_snapshot(&rows);
        let keys: Vec<_> = snap.iter().map(|r| (r.country(), r.year())).collect();
        assert_eq!(keys, vec![("A", 2021), ("B", 2020)]);
    }
}
