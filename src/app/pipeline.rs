//! Shared build pipeline used by the CLI commands and integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read wide CSV -> reshape -> standardize codes -> fill gaps -> drop empty rows
//! -> validate -> engineer features
//!
//! Front-ends then focus on presentation (printing reports or writing files).

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clean::{
    MissingStat, ValidationReport, drop_empty_rows, handle_missing_values, missing_data_stats,
    validate,
};
use crate::countries::{StandardizeReport, standardize_country_codes};
use crate::domain::{FeatureTables, Indicator, IndicatorRecord, PipelineConfig};
use crate::error::AppError;
use crate::features::engineer_features;
use crate::io::ingest::{
    ReshapeStats, RowError, TransformError, read_wide_csv, transform_wide_to_long,
};
use crate::io::tables::{CLEANED_FILE, write_cleaned_table, write_feature_tables};

/// Everything the cleaning stages produce.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub rows_read: usize,
    pub footer_rows: usize,
    pub row_errors: Vec<RowError>,
    pub reshape: ReshapeStats,
    pub indicators_found: Vec<Indicator>,
    pub standardize: StandardizeReport,
    pub dropped_rows: usize,
    pub cleaned: Vec<IndicatorRecord>,
    pub validation: ValidationReport,
    pub missing_stats: Vec<MissingStat>,
}

/// All outputs of a `wdi build` run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean: CleanOutput,
    pub reference_year: Option<i32>,
    pub tables: FeatureTables,
}

/// Read, reshape, standardize, fill and validate.
pub fn run_cleaning(config: &PipelineConfig) -> Result<CleanOutput, AppError> {
    let wide = read_wide_csv(&config.input)?;
    for err in &wide.row_errors {
        warn!(line = err.line, message = %err.message, "skipped unreadable row");
    }

    let reshaped = transform_wide_to_long(&wide)?;
    let mut records = reshaped.records;

    let standardize = standardize_country_codes(&mut records);
    handle_missing_values(&mut records, config.missing);
    let dropped_rows = drop_empty_rows(&mut records);
    if records.is_empty() {
        return Err(TransformError::NoRows.into());
    }
    info!(
        rows = records.len(),
        dropped = dropped_rows,
        strategy = ?config.missing,
        "cleaned long table"
    );

    let validation = validate(&records);
    let missing_stats = missing_data_stats(&records);

    Ok(CleanOutput {
        rows_read: wide.rows_read,
        footer_rows: wide.footer_rows,
        row_errors: wide.row_errors,
        reshape: reshaped.stats,
        indicators_found: reshaped.indicators_found,
        standardize,
        dropped_rows,
        cleaned: records,
        validation,
        missing_stats,
    })
}

/// Full pipeline: cleaning followed by feature engineering.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput, AppError> {
    let clean = run_cleaning(config)?;
    let reference_year = config
        .reference_year
        .or_else(|| clean.cleaned.iter().map(|r| r.year).max());
    let tables = engineer_features(clean.cleaned.clone(), reference_year, config.rolling_window);

    Ok(PipelineOutput {
        clean,
        reference_year,
        tables,
    })
}

/// Write the cleaned table and the three feature tables. Returns every path written.
pub fn persist(output: &PipelineOutput, config: &PipelineConfig) -> Result<Vec<PathBuf>, AppError> {
    let cleaned_path = config.output_dir.join(CLEANED_FILE);
    write_cleaned_table(&cleaned_path, &output.clean.cleaned)?;

    let mut written = vec![cleaned_path];
    written.extend(write_feature_tables(&config.output_dir, &output.tables)?);
    Ok(written)
}
