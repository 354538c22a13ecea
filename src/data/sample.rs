//! Synthetic World-Bank-style wide CSV generation.
//!
//! Produces the same layout as a WDI DataBank export: four id columns, one
//! `YYYY [YRYYYY]` column per year, `..` for missing cells and a short footer.
//! Output is fully determined by the seed (except the "Last Updated" date).

use std::fs::{self, File};
use std::path::Path;

use chrono::Utc;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::Indicator;
use crate::error::AppError;

/// Starting point for one synthetic country.
struct Profile {
    name: &'static str,
    code: &'static str,
    gdp_pc: f64,
    life_exp: f64,
    population: f64,
    /// Mean annual real growth of GDP per capita.
    drift: f64,
}

const fn p(
    name: &'static str,
    code: &'static str,
    gdp_pc: f64,
    life_exp: f64,
    population: f64,
    drift: f64,
) -> Profile {
    Profile {
        name,
        code,
        gdp_pc,
        life_exp,
        population,
        drift,
    }
}

/// Names follow World Bank spelling, so several need fuzzy or override resolution.
const PROFILES: &[Profile] = &[
    p("United States", "USA", 36_300.0, 76.6, 282_000_000.0, 0.018),
    p("China", "CHN", 960.0, 71.4, 1_262_000_000.0, 0.085),
    p("India", "IND", 440.0, 62.5, 1_057_000_000.0, 0.055),
    p("Germany", "DEU", 23_600.0, 77.9, 82_200_000.0, 0.012),
    p("Brazil", "BRA", 3_750.0, 70.1, 175_900_000.0, 0.015),
    p("Nigeria", "NGA", 570.0, 46.3, 122_900_000.0, 0.022),
    p("Japan", "JPN", 39_200.0, 81.1, 126_800_000.0, 0.006),
    p("Egypt, Arab Rep.", "EGY", 1_450.0, 68.6, 71_400_000.0, 0.025),
    p("Korea, Rep.", "KOR", 12_260.0, 75.9, 47_000_000.0, 0.030),
    p("Viet Nam", "VNM", 390.0, 71.9, 79_000_000.0, 0.060),
    p("Iran, Islamic Rep.", "IRN", 1_680.0, 70.2, 66_000_000.0, 0.020),
    p("Cote d'Ivoire", "CIV", 620.0, 49.4, 16_800_000.0, 0.015),
    p("France", "FRA", 22_400.0, 79.1, 60_900_000.0, 0.011),
    p("Mexico", "MEX", 7_160.0, 74.4, 98_600_000.0, 0.010),
    p("Kenya", "KEN", 410.0, 52.3, 31_400_000.0, 0.025),
    p("Australia", "AUS", 21_700.0, 79.2, 19_150_000.0, 0.015),
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub countries: usize,
    pub start_year: i32,
    pub end_year: i32,
    pub seed: u64,
    pub missing_prob: f64,
}

/// The generated table, before serialization.
#[derive(Debug, Clone)]
pub struct SampleTable {
    pub years: Vec<i32>,
    /// `(country name, country code, series, one cell per year)`.
    pub rows: Vec<(String, String, Indicator, Vec<Option<f64>>)>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleTable, AppError> {
    if config.countries == 0 {
        return Err(AppError::new(2, "Country count must be > 0."));
    }
    if config.end_year < config.start_year {
        return Err(AppError::new(2, "End year must not be before start year."));
    }
    if !(0.0..1.0).contains(&config.missing_prob) {
        return Err(AppError::new(2, "Missing probability must be in [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let years: Vec<i32> = (config.start_year..=config.end_year).collect();
    let mut rows = Vec::with_capacity(config.countries.min(PROFILES.len()) * Indicator::ALL.len());

    for profile in PROFILES.iter().take(config.countries) {
        let mut gdp = Vec::with_capacity(years.len());
        let mut growth = Vec::with_capacity(years.len());
        let mut life = Vec::with_capacity(years.len());
        let mut pop = Vec::with_capacity(years.len());

        let mut level = profile.gdp_pc;
        let mut expectancy = profile.life_exp;
        let pop_rate = 0.004 + 0.02 * rng.r#gen::<f64>();

        for (t, _) in years.iter().enumerate() {
            let shock = 0.03 * noise.sample(&mut rng);
            let log_return = profile.drift + shock;
            if t > 0 {
                level *= log_return.exp();
            }
            gdp.push(level);
            growth.push(100.0 * log_return + 0.5 * noise.sample(&mut rng));

            expectancy = (expectancy + 0.25 + 0.1 * noise.sample(&mut rng)).min(86.0);
            life.push(expectancy);
            pop.push((profile.population * (1.0 + pop_rate).powi(t as i32)).round());
        }

        for (indicator, values) in [
            (Indicator::GdpPerCapita, gdp),
            (Indicator::Population, pop),
            (Indicator::LifeExpectancy, life),
            (Indicator::IncomeGrowth, growth),
        ] {
            let cells = values
                .into_iter()
                .map(|v| (!rng.gen_bool(config.missing_prob)).then_some(v))
                .collect();
            rows.push((profile.name.to_string(), profile.code.to_string(), indicator, cells));
        }
    }

    Ok(SampleTable { years, rows })
}

/// Serialize a sample in the DataBank layout.
pub fn write_sample_csv(path: &Path, table: &SampleTable) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(4, format!("Failed to create '{}': {e}", parent.display()))
        })?;
    }
    let file = File::create(path).map_err(|e| {
        AppError::new(4, format!("Failed to create sample '{}': {e}", path.display()))
    })?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    let io_err = |e: csv::Error| AppError::new(4, format!("Failed to write sample CSV: {e}"));

    let mut header = vec![
        "Country Name".to_string(),
        "Country Code".to_string(),
        "Series Name".to_string(),
        "Series Code".to_string(),
    ];
    header.extend(table.years.iter().map(|y| format!("{y} [YR{y}]")));
    writer.write_record(&header).map_err(io_err)?;

    for (country, code, indicator, cells) in &table.rows {
        let mut record = vec![
            country.clone(),
            code.clone(),
            series_name(*indicator).to_string(),
            indicator.series_code().to_string(),
        ];
        record.extend(cells.iter().map(|c| match c {
            Some(v) => format!("{v:.4}"),
            None => "..".to_string(),
        }));
        writer.write_record(&record).map_err(io_err)?;
    }

    // DataBank footer.
    writer.write_record([""]).map_err(io_err)?;
    writer.write_record([""]).map_err(io_err)?;
    writer
        .write_record(["Data from database: World Development Indicators"])
        .map_err(io_err)?;
    writer
        .write_record([format!("Last Updated: {}", Utc::now().format("%m/%d/%Y"))])
        .map_err(io_err)?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write sample CSV: {e}")))?;

    info!(
        path = %path.display(),
        rows = table.rows.len(),
        years = table.years.len(),
        "wrote sample"
    );
    Ok(())
}

fn series_name(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::GdpPerCapita => "GDP per capita (current US$)",
        Indicator::Population => "Population, total",
        Indicator::LifeExpectancy => "Life expectancy at birth, total (years)",
        Indicator::IncomeGrowth => "Adjusted net national income per capita (annual % growth)",
    }
}
