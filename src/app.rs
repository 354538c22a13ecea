//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and environment defaults
//! - runs the cleaning/feature pipeline and persists the tables
//! - answers read-side queries (KPIs, compare, relationships, forecast, export)
//! - launches the dashboard

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::cli::{
    BuildArgs, Command, CompareArgs, ExportArgs, ForecastArgs, KpiArgs, RelationshipsArgs,
    SampleArgs, TuiArgs, ValidateArgs,
};
use crate::config::EnvConfig;
use crate::data::sample::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::{MissingStrategy, PipelineConfig};
use crate::error::AppError;
use crate::io::export::{ExportFormat, export_table};
use crate::query::{
    RowFilter, available_years, compute_kpis, correlation_matrix, correlations, filter_rows,
    previous_year_for,
};
use crate::store::TableCache;

pub mod pipeline;

/// Entry point for the `wdi` binary.
pub fn run() -> Result<(), AppError> {
    // `wdi` and `wdi --dir X` behave like `wdi tui ...`; clap needs the
    // subcommand spelled out, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let env = EnvConfig::from_env();

    let filter = match cli.command {
        Command::Tui(_) => crate::logging::TUI_FILTER,
        _ => crate::logging::DEFAULT_FILTER,
    };
    crate::logging::init(filter);

    match cli.command {
        Command::Build(args) => handle_build(args, &env),
        Command::Validate(args) => handle_validate(args, &env),
        Command::Kpis(args) => handle_kpis(args, &env),
        Command::Forecast(args) => handle_forecast(args, &env),
        Command::Export(args) => handle_export(args, &env),
        Command::Compare(args) => handle_compare(args, &env),
        Command::Relationships(args) => handle_relationships(args, &env),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args, &env),
    }
}

fn handle_build(args: BuildArgs, env: &EnvConfig) -> Result<(), AppError> {
    let config = PipelineConfig {
        input: resolve_input(args.input, env)?,
        output_dir: env.features_dir_or(args.output_dir),
        missing: args.missing,
        reference_year: args.reference_year,
        rolling_window: args.window,
    };

    let output = pipeline::run_pipeline(&config)?;
    let written = pipeline::persist(&output, &config)?;
    info!(files = written.len(), dir = %config.output_dir.display(), "build complete");

    println!("{}", crate::report::format_build_summary(&output, &written));
    Ok(())
}

fn handle_validate(args: ValidateArgs, env: &EnvConfig) -> Result<(), AppError> {
    let config = PipelineConfig {
        input: resolve_input(args.input, env)?,
        output_dir: env.features_dir.clone(),
        missing: args.missing,
        reference_year: None,
        rolling_window: crate::features::DEFAULT_ROLLING_WINDOW,
    };
    let clean = pipeline::run_cleaning(&config)?;
    println!("{}", crate::report::format_clean_summary(&clean));
    Ok(())
}

fn handle_kpis(args: KpiArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    let tables = cache.get_or_load()?;

    let filter = RowFilter::new(args.countries, None);
    let rows = filter_rows(&tables.main_data, &filter);
    let years = available_years(&rows);
    let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
        return Err(AppError::new(3, "No rows match the selected countries."));
    };

    let year = args.year.unwrap_or(last);
    let previous = previous_year_for(year, args.start_year.unwrap_or(first));
    println!("{}", crate::report::format_kpis(&compute_kpis(&rows, year, previous)));
    Ok(())
}

fn handle_forecast(args: ForecastArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    let tables = cache.get_or_load()?;

    let result = crate::query::forecast_for(
        &tables,
        &args.country,
        args.indicator,
        args.method,
        args.horizon,
    )?;
    println!("{}", crate::report::format_forecast(&result));
    if args.plot {
        println!("{}", crate::plot::render_forecast_plot(&result, args.width, args.height));
    }
    Ok(())
}

fn handle_export(args: ExportArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    let tables = cache.get_or_load()?;

    let years = match (args.from_year, args.to_year) {
        (None, None) => None,
        (from, to) => Some((from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))),
    };
    let filter = RowFilter::new(args.countries, years);
    let format = args.format.unwrap_or_else(|| ExportFormat::from_path(&args.output));

    let rows = export_table(&args.output, &tables, args.table, &filter, format)?;
    println!("Exported {rows} rows to {}", args.output.display());
    Ok(())
}

fn handle_compare(args: CompareArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    let tables = cache.get_or_load()?;

    let rows = crate::query::compare_countries(&tables, &args.countries);
    if rows.is_empty() {
        return Err(AppError::new(3, "None of the requested countries are in the latest snapshot."));
    }
    println!("{}", crate::report::format_compare(&rows));
    Ok(())
}

fn handle_relationships(args: RelationshipsArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    let tables = cache.get_or_load()?;

    let rows = filter_rows(&tables.main_data, &RowFilter::new(args.countries.clone(), None));
    let Some(&last) = available_years(&rows).last() else {
        return Err(AppError::new(3, "No rows match the selected countries."));
    };
    let year = args.year.unwrap_or(last);

    let pairs = correlations(&rows, year, &args.countries);
    let matrix = correlation_matrix(&rows, &args.countries);
    println!("{}", crate::report::format_relationships(year, &pairs, &matrix));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        countries: args.countries,
        start_year: args.start_year,
        end_year: args.end_year,
        seed: args.seed,
        missing_prob: args.missing_prob,
    };
    let table = generate_sample(&config)?;
    write_sample_csv(&args.output, &table)?;
    println!(
        "Wrote {} series rows x {} years to {}",
        table.rows.len(),
        table.years.len(),
        args.output.display()
    );
    Ok(())
}

fn handle_tui(args: TuiArgs, env: &EnvConfig) -> Result<(), AppError> {
    let cache = TableCache::new(env.features_dir_or(args.tables.dir));
    crate::tui::run(&cache)
}

/// `-f` flag, then `WDI_RAW_CSV`, then the interactive picker.
fn resolve_input(flag: Option<PathBuf>, env: &EnvConfig) -> Result<PathBuf, AppError> {
    match flag.or_else(|| env.raw_csv.clone()) {
        Some(path) => crate::cli::picker::validate_csv_path(&path),
        None => crate::cli::picker::prompt_for_csv_path(),
    }
}

/// Default strategy for callers that build a config without CLI flags.
pub fn default_pipeline_config(input: PathBuf, output_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        input,
        output_dir,
        missing: MissingStrategy::ForwardFill,
        reference_year: None,
        rolling_window: crate::features::DEFAULT_ROLLING_WINDOW,
    }
}

/// Rewrite argv so `wdi` defaults to `wdi tui`.
///
/// Rules:
/// - `wdi`                      -> `wdi tui`
/// - `wdi --dir out ...`        -> `wdi tui --dir out ...`
/// - `wdi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    if matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help") {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "build"
            | "validate"
            | "kpis"
            | "forecast"
            | "export"
            | "compare"
            | "relationships"
            | "sample"
            | "tui"
    );
    if !is_subcommand && arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_dashboard() {
        assert_eq!(rewrite_args(args(&["wdi"])), args(&["wdi", "tui"]));
        assert_eq!(rewrite_args(args(&["wdi", "--dir", "x"])), args(&["wdi", "tui", "--dir", "x"]));
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["wdi", "build", "-f", "a.csv"])),
            args(&["wdi", "build", "-f", "a.csv"])
        );
        assert_eq!(rewrite_args(args(&["wdi", "--help"])), args(&["wdi", "--help"]));
    }
}
