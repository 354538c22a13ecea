//! Sanity checks over the cleaned long table.
//!
//! Validation is advisory: an ERROR status is reported and logged but the
//! table is still used downstream.

use serde::Serialize;
use tracing::warn;

use crate::domain::{Indicator, IndicatorRecord};

const LIFE_EXPECTANCY_MIN: f64 = 20.0;
const LIFE_EXPECTANCY_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationCheck {
    pub check: &'static str,
    pub count: usize,
    pub status: CheckStatus,
}

impl ValidationCheck {
    fn new(check: &'static str, count: usize, when_nonzero: CheckStatus) -> Self {
        let status = if count == 0 { CheckStatus::Pass } else { when_nonzero };
        Self { check, count, status }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// True unless some check has status ERROR.
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Error)
    }
}

/// Run the four checks.
pub fn validate(records: &[IndicatorRecord]) -> ValidationReport {
    let missing_iso = records.iter().filter(|r| r.iso_code.is_none()).count();
    let negative_population = records
        .iter()
        .filter(|r| r.population_total.is_some_and(|p| p < 0.0))
        .count();
    let implausible_life = records
        .iter()
        .filter(|r| {
            r.life_expectancy_years
                .is_some_and(|v| !(LIFE_EXPECTANCY_MIN..=LIFE_EXPECTANCY_MAX).contains(&v))
        })
        .count();
    let residual_nulls = missing_iso
        + records
            .iter()
            .map(|r| Indicator::ALL.iter().filter(|&&ind| r.value(ind).is_none()).count())
            .sum::<usize>();

    let report = ValidationReport {
        checks: vec![
            ValidationCheck::new("Missing ISO codes", missing_iso, CheckStatus::Warning),
            ValidationCheck::new(
                "Negative population values",
                negative_population,
                CheckStatus::Error,
            ),
            ValidationCheck::new(
                "Unrealistic life expectancy values",
                implausible_life,
                CheckStatus::Error,
            ),
            ValidationCheck::new(
                "Total missing values after handling",
                residual_nulls,
                CheckStatus::Warning,
            ),
        ],
    };

    for check in report.checks.iter().filter(|c| c.status == CheckStatus::Error) {
        warn!(check = check.check, count = check.count, "validation check failed");
    }
    report
}

/// Missing-value counts for one column of the cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingStat {
    pub column: &'static str,
    pub total_values: usize,
    pub missing_values: usize,
    pub missing_pct: f64,
}

/// Per-column missing-value statistics, in persisted column order.
pub fn missing_data_stats(records: &[IndicatorRecord]) -> Vec<MissingStat> {
    let n = records.len();
    let stat = |column: &'static str, missing: usize| MissingStat {
        column,
        total_values: n - missing,
        missing_values: missing,
        missing_pct: if n == 0 { 0.0 } else { missing as f64 / n as f64 * 100.0 },
    };

    let mut out = vec![
        stat("country", 0),
        stat("iso_code", records.iter().filter(|r| r.iso_code.is_none()).count()),
        stat("year", 0),
    ];
    for ind in Indicator::ALL {
        out.push(stat(ind.key(), records.iter().filter(|r| r.value(ind).is_none()).count()));
    }
    out
}
