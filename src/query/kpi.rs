//! Headline numbers for one year, compared with a prior year.

use serde::Serialize;

use crate::domain::{FeatureRecord, Indicator};
use crate::features::pct_change;

/// How a KPI is aggregated across countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Aggregation {
    Median,
    Sum,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Delta {
    /// Relative change in percent.
    Percent(f64),
    /// Difference in the indicator's own unit.
    Absolute(f64),
}

impl Delta {
    pub fn value(self) -> f64 {
        match self {
            Delta::Percent(d) | Delta::Absolute(d) => d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub indicator: Indicator,
    pub aggregation: Aggregation,
    pub value: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<Delta>,
}

impl Kpi {
    pub fn formatted_value(&self) -> String {
        self.indicator.format_value(self.value)
    }

    pub fn formatted_delta(&self) -> String {
        match self.delta {
            Some(Delta::Percent(d)) => format!("{d:+.1}%"),
            Some(Delta::Absolute(d)) => match self.indicator {
                Indicator::LifeExpectancy => format!("{d:+.1} yrs"),
                Indicator::IncomeGrowth => format!("{d:+.1} pp"),
                _ => format!("{d:+.1}"),
            },
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub year: i32,
    pub previous_year: i32,
    pub kpis: Vec<Kpi>,
}

/// The comparison year: one year back, unless `year` is already the start of the selection.
pub fn previous_year_for(year: i32, selection_start: i32) -> i32 {
    if year > selection_start { year - 1 } else { year }
}

const KPI_DEFS: [(&str, Indicator, Aggregation); 4] = [
    ("Median GDP per Capita", Indicator::GdpPerCapita, Aggregation::Median),
    ("Median Life Expectancy", Indicator::LifeExpectancy, Aggregation::Median),
    ("Total Population", Indicator::Population, Aggregation::Sum),
    ("Avg Income Growth", Indicator::IncomeGrowth, Aggregation::Mean),
];

/// KPIs over `rows` for `year`, with deltas against `previous_year`.
///
/// GDP and population deltas are relative; life expectancy and income growth
/// deltas are absolute. A delta is `None` whenever either side is missing or a
/// relative base is zero.
pub fn compute_kpis(rows: &[FeatureRecord], year: i32, previous_year: i32) -> KpiSummary {
    let kpis = KPI_DEFS
        .iter()
        .map(|&(label, indicator, aggregation)| {
            let value = aggregate(rows, year, indicator, aggregation);
            let previous = aggregate(rows, previous_year, indicator, aggregation);
            let delta = match (value, previous) {
                (Some(cur), Some(prev)) => match indicator {
                    Indicator::GdpPerCapita | Indicator::Population => {
                        pct_change(prev, cur).map(Delta::Percent)
                    }
                    Indicator::LifeExpectancy | Indicator::IncomeGrowth => {
                        Some(Delta::Absolute(cur - prev))
                    }
                },
                _ => None,
            };
            Kpi {
                label,
                indicator,
                aggregation,
                value,
                previous,
                delta,
            }
        })
        .collect();

    KpiSummary {
        year,
        previous_year,
        kpis,
    }
}

fn aggregate(
    rows: &[FeatureRecord],
    year: i32,
    indicator: Indicator,
    how: Aggregation,
) -> Option<f64> {
    let mut values: Vec<f64> = rows
        .iter()
        .filter(|r| r.year() == year)
        .filter_map(|r| r.value(indicator))
        .collect();
    if values.is_empty() {
        return None;
    }
    match how {
        Aggregation::Sum => Some(values.iter().sum()),
        Aggregation::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Aggregation::Median => Some(median(&mut values)),
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;
    use approx::assert_abs_diff_eq;

    fn row(c: &str, year: i32, gdp: f64, life: f64, pop: f64, growth: f64) -> FeatureRecord {
        FeatureRecord::from_base(
            IndicatorRecord::new(c, None, year)
                .with(Indicator::GdpPerCapita, gdp)
                .with(Indicator::LifeExpectancy, life)
                .with(Indicator::Population, pop)
                .with(Indicator::IncomeGrowth, growth),
        )
    }

    fn data() -> Vec<FeatureRecord> {
        vec![
            row("A", 2019, 100.0, 70.0, 10.0, 1.0),
            row("B", 2019, 300.0, 80.0, 30.0, 3.0),
            row("A", 2020, 110.0, 71.0, 11.0, 2.0),
            row("B", 2020, 330.0, 80.0, 33.0, 5.0),
            row("C", 2020, 400.0, 60.0, 6.0, -1.0),
        ]
    }

    #[test]
    fn kpis_use_median_sum_and_mean() {
        let s = compute_kpis(&data(), 2020, 2019);
        assert_abs_diff_eq!(s.kpis[0].value.unwrap(), 330.0);
        assert_abs_diff_eq!(s.kpis[0].previous.unwrap(), 200.0);
        assert_abs_diff_eq!(s.kpis[1].value.unwrap(), 71.0);
        assert_abs_diff_eq!(s.kpis[2].value.unwrap(), 50.0);
        assert_abs_diff_eq!(s.kpis[3].value.unwrap(), 2.0);
    }

    #[test]
    fn deltas_are_percent_or_absolute_by_indicator() {
        let s = compute_kpis(&data(), 2020, 2019);
        match s.kpis[0].delta {
            Some(Delta::Percent(d)) => assert_abs_diff_eq!(d, 65.0, epsilon = 1e-9),
            other => panic!("expected percent delta, got {other:?}"),
        }
        assert_eq!(s.kpis[1].delta, Some(Delta::Absolute(-4.0)));
        assert_eq!(s.kpis[2].delta, Some(Delta::Percent(25.0)));
        assert_eq!(s.kpis[3].formatted_delta(), "+0.0 pp");
    }

    #[test]
    fn missing_previous_year_gives_na() {
        let s = compute_kpis(&data(), 2020, 2005);
        assert!(s.kpis.iter().all(|k| k.delta.is_none()));
        assert_eq!(s.kpis[0].formatted_delta(), "N/A");
        assert_eq!(s.kpis[0].formatted_value(), "$330");
    }

    #[test]
    fn previous_year_stops_at_selection_start() {
        assert_eq!(previous_year_for(2020, 2000), 2019);
        assert_eq!(previous_year_for(2000, 2000), 2000);
    }
}
