//! Persisted tables.
//!
//! The build step writes four CSVs into the features directory:
//!
//! - `main_data.csv`: every (country, year) row with derived features
//! - `latest_snapshot.csv`: one row per country at its latest year
//! - `world_aggregates.csv`: one row per year
//! - `indicators_cleaned.csv`: the cleaned long table before features
//!
//! Missing values are written as empty cells. The rolling column name embeds
//! the window (`ann_income_pc_growth_pct_rolling_3yr`) and is detected on load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::info;

use crate::domain::{FeatureRecord, FeatureTables, Indicator, IndicatorRecord, WorldAggregate};
use crate::error::AppError;

pub const MAIN_DATA_FILE: &str = "main_data.csv";
pub const SNAPSHOT_FILE: &str = "latest_snapshot.csv";
pub const WORLD_FILE: &str = "world_aggregates.csv";
pub const CLEANED_FILE: &str = "indicators_cleaned.csv";

const ROLLING_PREFIX: &str = "ann_income_pc_growth_pct_rolling_";
const ROLLING_SUFFIX: &str = "yr";

const WORLD_COLUMNS: [&str; 5] = [
    "year",
    "world_gdp_pc_weighted",
    "world_life_expectancy_weighted",
    "world_income_growth_weighted",
    "world_population_total",
];

/// A persisted table could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Feature table not found: '{path}'")]
    Missing { path: String },

    #[error("Feature table '{path}' is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

pub fn rolling_column(window: usize) -> String {
    format!("{ROLLING_PREFIX}{window}{ROLLING_SUFFIX}")
}

/// Column names of the cleaned long table.
pub fn base_header() -> Vec<String> {
    let mut header = vec!["country".to_string(), "iso_code".to_string(), "year".to_string()];
    header.extend(Indicator::ALL.iter().map(|ind| ind.key().to_string()));
    header
}

/// Column names of `main_data` / `latest_snapshot`.
pub fn feature_header(window: usize) -> Vec<String> {
    let mut header = base_header();
    header.push("gdp_pc_rank".to_string());
    header.push("population_rank".to_string());
    header.push(rolling_column(window));
    header.extend(Indicator::YOY.iter().map(|ind| yoy_column(*ind)));
    header
}

pub fn world_header() -> Vec<String> {
    WORLD_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn yoy_column(indicator: Indicator) -> String {
    format!("{}_yoy_pct", indicator.key())
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub fn base_row(r: &IndicatorRecord) -> Vec<String> {
    let mut row = vec![
        r.country.clone(),
        r.iso_code.clone().unwrap_or_default(),
        r.year.to_string(),
    ];
    row.extend(Indicator::ALL.iter().map(|&ind| opt_num(r.value(ind))));
    row
}

pub fn feature_row(r: &FeatureRecord) -> Vec<String> {
    let mut row = base_row(&r.base);
    row.push(r.gdp_pc_rank.map(|v| v.to_string()).unwrap_or_default());
    row.push(r.population_rank.map(|v| v.to_string()).unwrap_or_default());
    row.push(opt_num(r.income_growth_rolling));
    row.extend(Indicator::YOY.iter().map(|&ind| opt_num(r.yoy(ind))));
    row
}

pub fn world_row(w: &WorldAggregate) -> Vec<String> {
    vec![
        w.year.to_string(),
        opt_num(w.world_gdp_pc_weighted),
        opt_num(w.world_life_expectancy_weighted),
        opt_num(w.world_income_growth_weighted),
        w.world_population_total.to_string(),
    ]
}

/// Write rows to a CSV file, creating parent directories.
pub fn write_csv(
    path: &Path,
    header: &[String],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(4, format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }
    let write_err =
        |e: csv::Error| AppError::new(4, format!("Failed to write CSV '{}': {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    writer.write_record(header).map_err(write_err)?;
    for row in rows {
        writer.write_record(&row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the three feature tables into `dir`. Returns the written paths.
pub fn write_feature_tables(dir: &Path, tables: &FeatureTables) -> Result<Vec<PathBuf>, AppError> {
    let header = feature_header(tables.rolling_window);

    let main = dir.join(MAIN_DATA_FILE);
    write_csv(&main, &header, tables.main_data.iter().map(feature_row))?;
    let snapshot = dir.join(SNAPSHOT_FILE);
    write_csv(&snapshot, &header, tables.latest_snapshot.iter().map(feature_row))?;
    let world = dir.join(WORLD_FILE);
    write_csv(&world, &world_header(), tables.world_aggregates.iter().map(world_row))?;

    let written = vec![main, snapshot, world];
    for path in &written {
        info!(path = %path.display(), "wrote feature table");
    }
    Ok(written)
}

pub fn write_cleaned_table(path: &Path, records: &[IndicatorRecord]) -> Result<(), AppError> {
    write_csv(path, &base_header(), records.iter().map(base_row))?;
    info!(path = %path.display(), rows = records.len(), "wrote cleaned table");
    Ok(())
}

/// Load the three feature tables from `dir`.
pub fn load_feature_tables(dir: &Path) -> Result<FeatureTables, LoadError> {
    let (window, main_data) = read_feature_csv(&dir.join(MAIN_DATA_FILE))?;
    let (_, latest_snapshot) = read_feature_csv(&dir.join(SNAPSHOT_FILE))?;
    let world_aggregates = read_world_csv(&dir.join(WORLD_FILE))?;

    info!(
        dir = %dir.display(),
        rows = main_data.len(),
        countries = latest_snapshot.len(),
        years = world_aggregates.len(),
        "loaded feature tables"
    );
    Ok(FeatureTables {
        main_data,
        latest_snapshot,
        world_aggregates,
        rolling_window: window,
    })
}

/// Header lookup plus per-cell parsing, with errors tied to the file.
struct TableReader {
    path: String,
    columns: HashMap<String, usize>,
}

impl TableReader {
    fn open(path: &Path) -> Result<(Self, csv::Reader<fs::File>), LoadError> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(LoadError::Missing { path: display });
        }
        let mut reader = csv::Reader::from_path(path).map_err(|e| LoadError::Corrupt {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let headers = reader
            .headers()
            .map_err(|e| LoadError::Corrupt {
                path: display.clone(),
                message: e.to_string(),
            })?
            .clone();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();
        Ok((Self { path: display, columns }, reader))
    }

    fn corrupt(&self, message: impl Into<String>) -> LoadError {
        LoadError::Corrupt {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn index(&self, name: &str) -> Result<usize, LoadError> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| self.corrupt(format!("missing column `{name}`")))
    }

    fn rolling_window(&self) -> Result<(usize, usize), LoadError> {
        self.columns
            .iter()
            .find_map(|(name, &idx)| {
                name.strip_prefix(ROLLING_PREFIX)
                    .and_then(|rest| rest.strip_suffix(ROLLING_SUFFIX))
                    .and_then(|w| w.parse::<usize>().ok())
                    .filter(|&w| w > 0)
                    .map(|w| (w, idx))
            })
            .ok_or_else(|| {
                self.corrupt(format!("missing column `{ROLLING_PREFIX}<N>{ROLLING_SUFFIX}`"))
            })
    }

    fn records(
        &self,
        reader: csv::Reader<fs::File>,
    ) -> impl Iterator<Item = Result<(usize, StringRecord), LoadError>> + '_ {
        reader.into_records().enumerate().map(move |(i, r)| {
            r.map(|rec| (i + 2, rec))
                .map_err(|e| self.corrupt(format!("line {}: {e}", i + 2)))
        })
    }

    fn text<'r>(&self, rec: &'r StringRecord, idx: usize) -> Option<&'r str> {
        rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn required_text(
        &self,
        rec: &StringRecord,
        idx: usize,
        line: usize,
    ) -> Result<String, LoadError> {
        self.text(rec, idx)
            .map(str::to_string)
            .ok_or_else(|| self.corrupt(format!("line {line}: empty required cell")))
    }

    fn parse<T: std::str::FromStr>(
        &self,
        rec: &StringRecord,
        idx: usize,
        line: usize,
    ) -> Result<Option<T>, LoadError> {
        match self.text(rec, idx) {
            None => Ok(None),
            Some(s) => s
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.corrupt(format!("line {line}: cannot parse `{s}`"))),
        }
    }
}

fn read_feature_csv(path: &Path) -> Result<(usize, Vec<FeatureRecord>), LoadError> {
    let (table, reader) = TableReader::open(path)?;

    let country = table.index("country")?;
    let iso = table.index("iso_code")?;
    let year_idx = table.index("year")?;
    let values: Vec<(Indicator, usize)> = Indicator::ALL
        .iter()
        .map(|&ind| table.index(ind.key()).map(|i| (ind, i)))
        .collect::<Result<_, _>>()?;
    let gdp_rank = table.index("gdp_pc_rank")?;
    let pop_rank = table.index("population_rank")?;
    let (window, rolling) = table.rolling_window()?;
    let yoy: Vec<(Indicator, usize)> = Indicator::YOY
        .iter()
        .map(|&ind| table.index(&yoy_column(ind)).map(|i| (ind, i)))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for item in table.records(reader) {
        let (line, rec) = item?;
        let year: i32 = table
            .parse(&rec, year_idx, line)?
            .ok_or_else(|| table.corrupt(format!("line {line}: missing year")))?;
        let mut base = IndicatorRecord::new(
            table.required_text(&rec, country, line)?,
            table.text(&rec, iso).map(str::to_string),
            year,
        );
        for &(ind, idx) in &values {
            base.set_value(ind, table.parse(&rec, idx, line)?);
        }

        let mut row = FeatureRecord::from_base(base);
        row.gdp_pc_rank = table.parse(&rec, gdp_rank, line)?;
        row.population_rank = table.parse(&rec, pop_rank, line)?;
        row.income_growth_rolling = table.parse(&rec, rolling, line)?;
        for &(ind, idx) in &yoy {
            row.set_yoy(ind, table.parse(&rec, idx, line)?);
        }
        rows.push(row);
    }
    Ok((window, rows))
}

fn read_world_csv(path: &Path) -> Result<Vec<WorldAggregate>, LoadError> {
    let (table, reader) = TableReader::open(path)?;
    let idx: Vec<usize> = WORLD_COLUMNS
        .iter()
        .map(|c| table.index(c))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for item in table.records(reader) {
        let (line, rec) = item?;
        rows.push(WorldAggregate {
            year: table
                .parse(&rec, idx[0], line)?
                .ok_or_else(|| table.corrupt(format!("line {line}: missing year")))?,
            world_gdp_pc_weighted: table.parse(&rec, idx[1], line)?,
            world_life_expectancy_weighted: table.parse(&rec, idx[2], line)?,
            world_income_growth_weighted: table.parse(&rec, idx[3], line)?,
            world_population_total: table.parse(&rec, idx[4], line)?.unwrap_or(0.0),
        });
    }
    Ok(rows)
}
