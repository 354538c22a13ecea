//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the cleaning/feature pipeline
//! - persisted to CSV and exported to JSON
//! - reloaded later by the dashboard and forecast queries

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The four indicators the dashboard understands.
///
/// Tables are walked through this enumeration rather than by column name; the
/// canonical key, World Bank series code, display label and formatting rule
/// all live here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// GDP per capita (current US$).
    #[value(name = "gdp")]
    GdpPerCapita,
    /// Life expectancy at birth, total (years).
    #[value(name = "life")]
    LifeExpectancy,
    /// Population, total.
    #[value(name = "population")]
    Population,
    /// Adjusted net national income per capita (annual % growth).
    #[value(name = "income-growth")]
    IncomeGrowth,
}

impl Indicator {
    /// Canonical column order for persisted tables.
    pub const ALL: [Indicator; 4] = [
        Indicator::IncomeGrowth,
        Indicator::GdpPerCapita,
        Indicator::LifeExpectancy,
        Indicator::Population,
    ];

    /// Indicators that get a year-over-year percentage column.
    pub const YOY: [Indicator; 3] = [
        Indicator::GdpPerCapita,
        Indicator::LifeExpectancy,
        Indicator::Population,
    ];

    /// Column key in the long table.
    pub fn key(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "gdp_pc_usd",
            Indicator::LifeExpectancy => "life_expectancy_years",
            Indicator::Population => "population_total",
            Indicator::IncomeGrowth => "ann_income_pc_growth_pct",
        }
    }

    /// World Bank WDI series code.
    pub fn series_code(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "NY.GDP.PCAP.CD",
            Indicator::LifeExpectancy => "SP.DYN.LE00.IN",
            Indicator::Population => "SP.POP.TOTL",
            Indicator::IncomeGrowth => "NY.ADJ.NNTY.PC.KD.ZG",
        }
    }

    /// Human-readable label for reports and charts.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP per Capita (Current US$)",
            Indicator::LifeExpectancy => "Life Expectancy (Years)",
            Indicator::Population => "Population",
            Indicator::IncomeGrowth => "Income Growth (%)",
        }
    }

    /// Short label for narrow table headers.
    pub fn short_label(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP pc",
            Indicator::LifeExpectancy => "Life exp",
            Indicator::Population => "Population",
            Indicator::IncomeGrowth => "Inc growth",
        }
    }

    pub fn from_series_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ind| ind.series_code() == code.trim())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ind| ind.key() == key.trim())
    }

    /// Format a value according to the indicator's display rule.
    pub fn format_value(self, value: Option<f64>) -> String {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return "N/A".to_string();
        };
        match self {
            Indicator::GdpPerCapita => format!("${}", group_thousands(v)),
            Indicator::Population => abbreviate(v, 1),
            Indicator::LifeExpectancy => format!("{v:.1} yrs"),
            Indicator::IncomeGrowth => format!("{v:.1}%"),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Indicator::GdpPerCapita => Indicator::LifeExpectancy,
            Indicator::LifeExpectancy => Indicator::Population,
            Indicator::Population => Indicator::IncomeGrowth,
            Indicator::IncomeGrowth => Indicator::GdpPerCapita,
        }
    }
}

/// Format a number with `B`/`M`/`K` suffixes.
pub fn abbreviate(v: f64, precision: usize) -> String {
    let a = v.abs();
    if a >= 1_000_000_000.0 {
        format!("{:.precision$}B", v / 1_000_000_000.0)
    } else if a >= 1_000_000.0 {
        format!("{:.precision$}M", v / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{:.precision$}K", v / 1_000.0)
    } else {
        format!("{v:.precision$}")
    }
}

/// Round to an integer and insert `,` thousands separators.
pub fn group_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        format!("-{out}")
    } else {
        out
    }
}

/// One row of the cleaned long table: one country in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub country: String,
    pub iso_code: Option<String>,
    pub year: i32,
    pub ann_income_pc_growth_pct: Option<f64>,
    pub gdp_pc_usd: Option<f64>,
    pub life_expectancy_years: Option<f64>,
    pub population_total: Option<f64>,
}

impl IndicatorRecord {
    pub fn new(country: impl Into<String>, iso_code: Option<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            iso_code,
            year,
            ann_income_pc_growth_pct: None,
            gdp_pc_usd: None,
            life_expectancy_years: None,
            population_total: None,
        }
    }

    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::GdpPerCapita => self.gdp_pc_usd,
            Indicator::LifeExpectancy => self.life_expectancy_years,
            Indicator::Population => self.population_total,
            Indicator::IncomeGrowth => self.ann_income_pc_growth_pct,
        }
    }

    pub fn set_value(&mut self, indicator: Indicator, value: Option<f64>) {
        let slot = match indicator {
            Indicator::GdpPerCapita => &mut self.gdp_pc_usd,
            Indicator::LifeExpectancy => &mut self.life_expectancy_years,
            Indicator::Population => &mut self.population_total,
            Indicator::IncomeGrowth => &mut self.ann_income_pc_growth_pct,
        };
        *slot = value;
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        self.set_value(indicator, Some(value));
        self
    }

    pub fn all_indicators_missing(&self) -> bool {
        Indicator::ALL.iter().all(|&ind| self.value(ind).is_none())
    }
}

/// An `IndicatorRecord` plus the derived per-country features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(flatten)]
    pub base: IndicatorRecord,
    /// Reference-year GDP rank (1 = highest), broadcast to every year of the country.
    pub gdp_pc_rank: Option<u32>,
    /// Reference-year population rank (1 = largest).
    pub population_rank: Option<u32>,
    /// Trailing mean of income growth over the table's rolling window.
    pub income_growth_rolling: Option<f64>,
    pub gdp_pc_usd_yoy_pct: Option<f64>,
    pub life_expectancy_years_yoy_pct: Option<f64>,
    pub population_total_yoy_pct: Option<f64>,
}

impl FeatureRecord {
    pub fn from_base(base: IndicatorRecord) -> Self {
        Self {
            base,
            gdp_pc_rank: None,
            population_rank: None,
            income_growth_rolling: None,
            gdp_pc_usd_yoy_pct: None,
            life_expectancy_years_yoy_pct: None,
            population_total_yoy_pct: None,
        }
    }

    pub fn country(&self) -> &str {
        &self.base.country
    }

    pub fn year(&self) -> i32 {
        self.base.year
    }

    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.base.value(indicator)
    }

    /// Year-over-year percentage change; `None` for indicators without a YoY column.
    pub fn yoy(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::GdpPerCapita => self.gdp_pc_usd_yoy_pct,
            Indicator::LifeExpectancy => self.life_expectancy_years_yoy_pct,
            Indicator::Population => self.population_total_yoy_pct,
            Indicator::IncomeGrowth => None,
        }
    }

    pub fn set_yoy(&mut self, indicator: Indicator, value: Option<f64>) {
        match indicator {
            Indicator::GdpPerCapita => self.gdp_pc_usd_yoy_pct = value,
            Indicator::LifeExpectancy => self.life_expectancy_years_yoy_pct = value,
            Indicator::Population => self.population_total_yoy_pct = value,
            Indicator::IncomeGrowth => {}
        }
    }
}

/// Population-weighted world values for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldAggregate {
    pub year: i32,
    pub world_gdp_pc_weighted: Option<f64>,
    pub world_life_expectancy_weighted: Option<f64>,
    pub world_income_growth_weighted: Option<f64>,
    pub world_population_total: f64,
}

impl WorldAggregate {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::GdpPerCapita => self.world_gdp_pc_weighted,
            Indicator::LifeExpectancy => self.world_life_expectancy_weighted,
            Indicator::IncomeGrowth => self.world_income_growth_weighted,
            Indicator::Population => Some(self.world_population_total),
        }
    }
}

/// The three tables produced by feature engineering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTables {
    pub main_data: Vec<FeatureRecord>,
    pub latest_snapshot: Vec<FeatureRecord>,
    pub world_aggregates: Vec<WorldAggregate>,
    /// Window used for the rolling income-growth column.
    pub rolling_window: usize,
}

/// Whether a forecast point was observed or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Historical,
    Forecast,
}

impl PointKind {
    pub fn label(self) -> &'static str {
        match self {
            PointKind::Historical => "Historical",
            PointKind::Forecast => "Forecast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub value: f64,
    pub kind: PointKind,
}

/// Gap-filling strategy applied after reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Forward then backward fill (population: linear interpolation).
    ForwardFill,
    /// Linear interpolation in both directions for every indicator.
    Interpolate,
    /// Leave gaps as they are.
    LeaveGaps,
}

/// Forecast algorithm selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Ordinary least squares trend line.
    Linear,
    /// Holt's additive-trend exponential smoothing.
    #[value(name = "exp-smoothing")]
    ExpSmoothing,
}

impl ForecastMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            ForecastMethod::Linear => "Linear Regression",
            ForecastMethod::ExpSmoothing => "Exponential Smoothing",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ForecastMethod::Linear => ForecastMethod::ExpSmoothing,
            ForecastMethod::ExpSmoothing => ForecastMethod::Linear,
        }
    }
}

/// A full build run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub missing: MissingStrategy,
    /// Year used for ranks; `None` means the latest year in the cleaned table.
    pub reference_year: Option<i32>,
    pub rolling_window: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_lookup_by_code_and_key() {
        assert_eq!(Indicator::from_series_code("SP.POP.TOTL"), Some(Indicator::Population));
        assert_eq!(Indicator::from_series_code(" NY.GDP.PCAP.CD "), Some(Indicator::GdpPerCapita));
        assert_eq!(Indicator::from_series_code("XX.UNKNOWN"), None);
        for ind in Indicator::ALL {
            assert_eq!(Indicator::from_key(ind.key()), Some(ind));
        }
    }

    #[test]
    fn format_rules() {
        assert_eq!(Indicator::GdpPerCapita.format_value(Some(12345.6)), "$12,346");
        assert_eq!(Indicator::Population.format_value(Some(1_400_000_000.0)), "1.4B");
        assert_eq!(Indicator::LifeExpectancy.format_value(Some(72.34)), "72.3 yrs");
        assert_eq!(Indicator::IncomeGrowth.format_value(Some(-1.26)), "-1.3%");
        assert_eq!(Indicator::IncomeGrowth.format_value(None), "N/A");
    }

    #[test]
    fn group_thousands_handles_sign_and_small_values() {
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(-1234567.0), "-1,234,567");
    }
}
