//! Filtered exports of the feature tables.
//!
//! CSV output keeps the persisted column order; JSON output is an array of
//! row objects.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::domain::FeatureTables;
use crate::error::AppError;
use crate::io::tables::{feature_header, feature_row, world_header, world_row, write_csv};
use crate::query::{RowFilter, filter_rows, filter_world};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTable {
    Main,
    Snapshot,
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Write one table, filtered, to `path`. Returns the number of rows written.
pub fn export_table(
    path: &Path,
    tables: &FeatureTables,
    table: ExportTable,
    filter: &RowFilter,
    format: ExportFormat,
) -> Result<usize, AppError> {
    let rows = match table {
        ExportTable::Main | ExportTable::Snapshot => {
            let source = if table == ExportTable::Main {
                &tables.main_data
            } else {
                &tables.latest_snapshot
            };
            let rows = filter_rows(source, filter);
            match format {
                ExportFormat::Csv => write_csv(
                    path,
                    &feature_header(tables.rolling_window),
                    rows.iter().map(feature_row),
                )?,
                ExportFormat::Json => write_json(path, &rows)?,
            }
            rows.len()
        }
        ExportTable::World => {
            let rows = filter_world(&tables.world_aggregates, filter);
            match format {
                ExportFormat::Csv => write_csv(path, &world_header(), rows.iter().map(world_row))?,
                ExportFormat::Json => write_json(path, &rows)?,
            }
            rows.len()
        }
    };

    info!(path = %path.display(), ?table, ?format, rows, "exported table");
    Ok(rows)
}

fn write_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(4, format!("Failed to create export '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, IndicatorRecord};
    use crate::features::engineer_features;

    fn tables() -> FeatureTables {
        let rec = |c: &str, y: i32| {
            IndicatorRecord::new(c, None, y)
                .with(Indicator::GdpPerCapita, 10.0)
                .with(Indicator::Population, 5.0)
        };
        engineer_features(vec![rec("A", 2019), rec("A", 2020), rec("B", 2020)], None, 3)
    }

    #[test]
    fn csv_export_respects_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let filter = RowFilter::new(vec!["A".into()], Some((2020, 2020)));

        let n =
            export_table(&path, &tables(), ExportTable::Main, &filter, ExportFormat::Csv).unwrap();
        assert_eq!(n, 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("country,iso_code,year,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn json_export_is_an_array_of_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        let all = RowFilter::default();
        export_table(&path, &tables(), ExportTable::World, &all, ExportFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["year"], 2020);
        assert_eq!(rows[1]["world_population_total"], 10.0);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("x.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("x")), ExportFormat::Csv);
    }
}
