//! Wide-format CSV ingest and wide-to-long reshape.
//!
//! This module is responsible for turning a World Bank style export
//! (`Country Name, Country Code, Series Name, Series Code, 2000 [YR2000], ...`)
//! into one `IndicatorRecord` per (country, year).
//!
//! Design goals:
//! - **Strict schema** for the id columns (clear errors + exit code 2)
//! - **Row-level tolerance** (skip unparseable lines, but report what happened)
//! - **Deterministic behavior** (stable output order, first occurrence wins)
//! - **Separation of concerns**: no code standardization or gap filling here

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Indicator, IndicatorRecord};

const COL_COUNTRY_NAME: &str = "Country Name";
const COL_COUNTRY_CODE: &str = "Country Code";
const COL_SERIES_NAME: &str = "Series Name";
const COL_SERIES_CODE: &str = "Series Code";

/// World Bank exports use `..` for "no data".
const NO_DATA_MARKER: &str = "..";

/// Fatal reshape failures. The pipeline produces no table when any of these occur.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to open CSV '{path}': {message}")]
    Open { path: String, message: String },

    #[error("Failed to read CSV headers: {0}")]
    Headers(String),

    #[error("Missing required column: `{0}`")]
    MissingColumn(&'static str),

    #[error("No year columns found (expected labels with a 4-digit year, e.g. `2015 [YR2015]`).")]
    NoYearColumns,

    #[error(
        "None of the recognized series codes were found \
         (NY.GDP.PCAP.CD, SP.POP.TOTL, SP.DYN.LE00.IN, NY.ADJ.NNTY.PC.KD.ZG)."
    )]
    NoRecognizedSeries,

    #[error("No data rows remain after reshaping.")]
    NoRows,
}

/// A row-level problem encountered while reading the wide table.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One year column of the wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct YearColumn {
    pub label: String,
    pub year: i32,
    /// Position in the raw CSV record.
    index: usize,
}

/// One (country, series) row of the wide table.
#[derive(Debug, Clone)]
pub struct WideRow {
    pub line: usize,
    pub country: String,
    pub country_code: Option<String>,
    pub series_name: Option<String>,
    pub series_code: Option<String>,
    /// Raw cell text aligned with `WideTable::year_columns`.
    pub cells: Vec<Option<String>>,
}

/// The parsed wide table, after empty rows/columns and footer rows are dropped.
#[derive(Debug, Clone)]
pub struct WideTable {
    pub year_columns: Vec<YearColumn>,
    pub rows: Vec<WideRow>,
    pub rows_read: usize,
    pub footer_rows: usize,
    pub row_errors: Vec<RowError>,
}

/// Counters describing what the reshape did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReshapeStats {
    pub series_rows_used: usize,
    pub series_rows_ignored: usize,
    pub no_data_cells: usize,
    pub non_numeric_cells: usize,
}

/// Reshape output: long records (pre-standardization) + diagnostics.
#[derive(Debug, Clone)]
pub struct ReshapedData {
    pub records: Vec<IndicatorRecord>,
    pub indicators_found: Vec<Indicator>,
    pub stats: ReshapeStats,
}

/// Read a wide CSV from disk.
pub fn read_wide_csv(path: &Path) -> Result<WideTable, TransformError> {
    let file = File::open(path).map_err(|e| TransformError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let table = parse_wide_csv(file)?;
    info!(
        path = %path.display(),
        rows_read = table.rows_read,
        rows_kept = table.rows.len(),
        year_columns = table.year_columns.len(),
        "read wide indicator table"
    );
    Ok(table)
}

/// Parse a wide CSV from any reader.
pub fn parse_wide_csv<R: Read>(reader: R) -> Result<WideTable, TransformError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| TransformError::Headers(e.to_string()))?
        .clone();

    let header_map = build_header_map(&headers);
    let country_idx = *header_map
        .get(COL_COUNTRY_NAME)
        .ok_or(TransformError::MissingColumn(COL_COUNTRY_NAME))?;
    let series_code_idx = *header_map
        .get(COL_SERIES_CODE)
        .ok_or(TransformError::MissingColumn(COL_SERIES_CODE))?;
    let country_code_idx = header_map.get(COL_COUNTRY_CODE).copied();
    let series_name_idx = header_map.get(COL_SERIES_NAME).copied();

    let id_columns = [Some(country_idx), Some(series_code_idx), country_code_idx, series_name_idx];
    let mut year_columns: Vec<YearColumn> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !id_columns.contains(&Some(*idx)))
        .filter_map(|(index, label)| {
            let label = normalize_header_name(label);
            extract_year(&label).map(|year| YearColumn { label, year, index })
        })
        .collect();

    if year_columns.is_empty() {
        return Err(TransformError::NoYearColumns);
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut footer_rows = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let Some(country) = get_cell(&record, Some(country_idx)) else {
            footer_rows += 1;
            continue;
        };

        let cells = year_columns
            .iter()
            .map(|col| get_cell(&record, Some(col.index)).map(str::to_string))
            .collect();

        rows.push(WideRow {
            line,
            country: country.to_string(),
            country_code: get_cell(&record, country_code_idx).map(str::to_string),
            series_name: get_cell(&record, series_name_idx).map(str::to_string),
            series_code: get_cell(&record, Some(series_code_idx)).map(str::to_string),
            cells,
        });
    }

    // Drop year columns that are empty in every row.
    let keep: Vec<bool> = (0..year_columns.len())
        .map(|c| rows.iter().any(|r: &WideRow| r.cells[c].is_some()))
        .collect();
    if keep.iter().any(|k| !k) {
        let mut col = 0;
        year_columns.retain(|_| {
            let k = keep[col];
            col += 1;
            k
        });
        for row in &mut rows {
            let mut col = 0;
            row.cells.retain(|_| {
                let k = keep[col];
                col += 1;
                k
            });
        }
    }

    Ok(WideTable {
        year_columns,
        rows,
        rows_read,
        footer_rows,
        row_errors,
    })
}

/// Reshape the wide table into one record per (country, year).
///
/// Only the four recognized series codes are kept; each becomes a column of
/// the output record. When a (country, year, series) cell appears more than
/// once, the first non-empty occurrence wins.
pub fn transform_wide_to_long(table: &WideTable) -> Result<ReshapedData, TransformError> {
    let mut stats = ReshapeStats::default();
    let mut found = Vec::new();

    // (country, year) -> record. BTreeMap keeps the output sorted by country then year.
    let mut pivot: BTreeMap<(String, i32), IndicatorRecord> = BTreeMap::new();
    let mut filled: HashSet<(String, i32, Indicator)> = HashSet::new();

    for row in &table.rows {
        let Some(indicator) = row.series_code.as_deref().and_then(Indicator::from_series_code)
        else {
            stats.series_rows_ignored += 1;
            continue;
        };
        stats.series_rows_used += 1;
        if !found.contains(&indicator) {
            found.push(indicator);
        }

        for (col, cell) in table.year_columns.iter().zip(&row.cells) {
            let key = (row.country.clone(), col.year);
            let record = pivot.entry(key).or_insert_with(|| {
                IndicatorRecord::new(row.country.clone(), row.country_code.clone(), col.year)
            });

            let Some(raw) = cell.as_deref() else { continue };
            let slot = (row.country.clone(), col.year, indicator);
            if !filled.insert(slot) {
                continue;
            }

            match parse_indicator_value(raw) {
                CellValue::Number(v) => record.set_value(indicator, Some(v)),
                CellValue::NoData => stats.no_data_cells += 1,
                CellValue::NonNumeric => {
                    stats.non_numeric_cells += 1;
                    debug!(
                        line = row.line,
                        year = col.year,
                        value = raw,
                        "non-numeric indicator cell"
                    );
                }
            }
        }
    }

    if found.is_empty() {
        return Err(TransformError::NoRecognizedSeries);
    }

    let records: Vec<IndicatorRecord> = pivot.into_values().collect();
    if records.is_empty() {
        return Err(TransformError::NoRows);
    }

    found.sort();
    info!(
        records = records.len(),
        indicators = found.len(),
        ignored_series_rows = stats.series_rows_ignored,
        "reshaped wide table to long format"
    );

    Ok(ReshapedData {
        records,
        indicators_found: found,
        stats,
    })
}

/// Classification of a raw indicator cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Number(f64),
    NoData,
    NonNumeric,
}

/// Coerce a raw cell to a number, treating placeholders as missing.
pub fn parse_indicator_value(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_DATA_MARKER {
        return CellValue::NoData;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::NonNumeric,
    }
}

/// Extract the first 4-digit run from a column label (`"2015 [YR2015]"` -> 2015).
pub fn extract_year(label: &str) -> Option<i32> {
    let bytes = label.as_bytes();
    let mut run_start = None;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let start = *run_start.get_or_insert(i);
            if i + 1 - start == 4 {
                return label[start..=i].parse().ok();
            }
        } else {
            run_start = None;
        }
    }
    None
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn get_cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}
