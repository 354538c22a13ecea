//! Pearson correlations between indicators across countries.
//!
//! Two views are offered: three headline pairs for a single year (rows with
//! either side missing are skipped pair by pair), and the full indicator
//! matrix over every year, restricted to rows where all four indicators are
//! present.

use serde::Serialize;

use crate::domain::{FeatureRecord, Indicator};
use crate::query::RowFilter;

/// Headline pairs, `(label, x, y)`.
pub const RELATIONSHIPS: [(&str, Indicator, Indicator); 3] = [
    ("GDP vs Life Expectancy", Indicator::GdpPerCapita, Indicator::LifeExpectancy),
    ("Income Growth vs GDP", Indicator::IncomeGrowth, Indicator::GdpPerCapita),
    ("Population vs GDP", Indicator::Population, Indicator::GdpPerCapita),
];

/// Row and column order of [`CorrelationMatrix`].
pub const MATRIX_ORDER: [Indicator; 4] = [
    Indicator::GdpPerCapita,
    Indicator::LifeExpectancy,
    Indicator::Population,
    Indicator::IncomeGrowth,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    NoRelationship,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
}

impl Strength {
    /// Bands: |r| > 0.7 strong, > 0.3 moderate, otherwise weak; exactly 0 is none.
    pub fn from_r(r: f64) -> Self {
        if r > 0.7 {
            Strength::StrongPositive
        } else if r > 0.3 {
            Strength::ModeratePositive
        } else if r > 0.0 {
            Strength::WeakPositive
        } else if r == 0.0 {
            Strength::NoRelationship
        } else if r > -0.3 {
            Strength::WeakNegative
        } else if r > -0.7 {
            Strength::ModerateNegative
        } else {
            Strength::StrongNegative
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::StrongPositive => "Strong positive",
            Strength::ModeratePositive => "Moderate positive",
            Strength::WeakPositive => "Weak positive",
            Strength::NoRelationship => "No relationship",
            Strength::WeakNegative => "Weak negative",
            Strength::ModerateNegative => "Moderate negative",
            Strength::StrongNegative => "Strong negative",
        }
    }
}

/// Correlation of one indicator pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub label: &'static str,
    pub x: Indicator,
    pub y: Indicator,
    /// `None` with fewer than two pairs or when either side is constant.
    pub r: Option<f64>,
    /// Countries with both values present.
    pub pairs: usize,
}

impl Relationship {
    pub fn strength(&self) -> Option<Strength> {
        self.r.map(Strength::from_r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub indicators: [Indicator; 4],
    pub values: [[Option<f64>; 4]; 4],
    /// Rows with all four indicators present.
    pub rows_used: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Indicator, b: Indicator) -> Option<f64> {
        let i = self.indicators.iter().position(|&ind| ind == a)?;
        let j = self.indicators.iter().position(|&ind| ind == b)?;
        self.values[i][j]
    }
}

/// Pearson's r over `(x, y)` pairs.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let (&(x0, y0), rest) = pairs.split_first()?;
    let constant_x = rest.iter().all(|&(x, _)| x == x0);
    let constant_y = rest.iter().all(|&(_, y)| y == y0);
    if rest.is_empty() || constant_x || constant_y {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

fn pairs_of<'a>(
    rows: impl IntoIterator<Item = &'a FeatureRecord>,
    x: Indicator,
    y: Indicator,
) -> Vec<(f64, f64)> {
    rows.into_iter()
        .filter_map(|r| Some((r.value(x)?, r.value(y)?)))
        .collect()
}

/// Headline correlations across `countries` (empty: all) in `year`.
pub fn correlations(rows: &[FeatureRecord], year: i32, countries: &[String]) -> Vec<Relationship> {
    let filter = RowFilter::new(countries.to_vec(), Some((year, year)));
    let selected: Vec<&FeatureRecord> = rows.iter().filter(|r| filter.matches(r)).collect();

    RELATIONSHIPS
        .iter()
        .map(|&(label, x, y)| {
            let pairs = pairs_of(selected.iter().copied(), x, y);
            Relationship {
                label,
                x,
                y,
                r: pearson(&pairs),
                pairs: pairs.len(),
            }
        })
        .collect()
}

/// Indicator-by-indicator matrix across all years for `countries` (empty: all).
pub fn correlation_matrix(rows: &[FeatureRecord], countries: &[String]) -> CorrelationMatrix {
    let filter = RowFilter::new(countries.to_vec(), None);
    let complete: Vec<&FeatureRecord> = rows
        .iter()
        .filter(|r| filter.matches_country(r.country()))
        .filter(|r| MATRIX_ORDER.iter().all(|&ind| r.value(ind).is_some()))
        .collect();

    let mut values = [[None; 4]; 4];
    for (i, &a) in MATRIX_ORDER.iter().enumerate() {
        for (j, &b) in MATRIX_ORDER.iter().enumerate().skip(i) {
            let r = pearson(&pairs_of(complete.iter().copied(), a, b));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        indicators: MATRIX_ORDER,
        values,
        rows_used: complete.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;
    use approx::assert_abs_diff_eq;

    fn row(
        country: &str,
        year: i32,
        gdp: f64,
        life: f64,
        pop: Option<f64>,
        growth: f64,
    ) -> FeatureRecord {
        let mut base = IndicatorRecord::new(country, None, year)
            .with(Indicator::GdpPerCapita, gdp)
            .with(Indicator::LifeExpectancy, life)
            .with(Indicator::IncomeGrowth, growth);
        base.population_total = pop;
        FeatureRecord::from_base(base)
    }

    fn by_label<'a>(out: &'a [Relationship], label: &str) -> &'a Relationship {
        out.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn perfectly_correlated_and_anti_correlated() {
        let rows = vec![
            row("A", 2020, 1_000.0, 60.0, Some(5.0), 3.0),
            row("B", 2020, 2_000.0, 65.0, Some(5.0), 2.0),
            row("C", 2020, 4_000.0, 75.0, Some(5.0), 0.0),
        ];
        let out = correlations(&rows, 2020, &[]);

        let gdp_life = by_label(&out, "GDP vs Life Expectancy");
        assert_abs_diff_eq!(gdp_life.r.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(gdp_life.strength(), Some(Strength::StrongPositive));
        assert_eq!(gdp_life.pairs, 3);

        let growth_gdp = by_label(&out, "Income Growth vs GDP");
        assert_abs_diff_eq!(growth_gdp.r.unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(growth_gdp.strength(), Some(Strength::StrongNegative));
    }

    #[test]
    fn constant_side_or_single_pair_has_no_coefficient() {
        let rows = vec![
            row("A", 2020, 1_000.0, 60.0, Some(5.0), 1.0),
            row("B", 2020, 2_000.0, 65.0, Some(5.0), 1.0),
            row("A", 2019, 900.0, 59.0, None, 1.0),
        ];
        let out = correlations(&rows, 2020, &[]);
        assert_eq!(by_label(&out, "Population vs GDP").r, None);
        assert_eq!(by_label(&out, "Income Growth vs GDP").r, None);
        assert_eq!(by_label(&out, "Income Growth vs GDP").strength(), None);

        let only_a = correlations(&rows, 2020, &["A".into()]);
        assert!(only_a.iter().all(|r| r.r.is_none() && r.pairs == 1));
        assert_eq!(pearson(&[]), None);
    }

    #[test]
    fn strength_bands() {
        assert_eq!(Strength::from_r(0.5), Strength::ModeratePositive);
        assert_eq!(Strength::from_r(0.1), Strength::WeakPositive);
        assert_eq!(Strength::from_r(0.0), Strength::NoRelationship);
        assert_eq!(Strength::from_r(-0.2), Strength::WeakNegative);
        assert_eq!(Strength::from_r(-0.5), Strength::ModerateNegative);
        assert_eq!(Strength::from_r(-0.7), Strength::StrongNegative);
        assert_eq!(Strength::from_r(-0.71).label(), "Strong negative");
    }

    #[test]
    fn matrix_uses_complete_rows_and_is_symmetric() {
        let rows = vec![
            row("A", 2019, 1_000.0, 60.0, Some(10.0), 3.0),
            row("A", 2020, 2_000.0, 62.0, Some(30.0), 1.0),
            row("B", 2020, 3_000.0, 70.0, Some(20.0), 2.0),
            row("B", 2021, 9_999.0, 10.0, None, 9.0),
        ];
        let m = correlation_matrix(&rows, &[]);
        assert_eq!(m.rows_used, 3);
        for &a in &MATRIX_ORDER {
            assert_abs_diff_eq!(m.get(a, a).unwrap(), 1.0, epsilon = 1e-12);
            for &b in &MATRIX_ORDER {
                assert_eq!(m.get(a, b), m.get(b, a));
            }
        }
        assert!(m.get(Indicator::GdpPerCapita, Indicator::LifeExpectancy).unwrap() > 0.9);
        assert_eq!(correlation_matrix(&rows, &["B".into()]).rows_used, 1);
    }
}
