//! Command-line parsing for the WDI indicator pipeline and dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/feature/forecast code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{ForecastMethod, Indicator, MissingStrategy};
use crate::features::DEFAULT_ROLLING_WINDOW;
use crate::forecast::DEFAULT_HORIZON;
use crate::io::export::{ExportFormat, ExportTable};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wdi", version, about = "World Development Indicators pipeline and dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean a raw wide CSV, engineer features and write the feature tables.
    Build(BuildArgs),
    /// Clean a raw wide CSV and print validation results without writing anything.
    Validate(ValidateArgs),
    /// Print headline KPIs for a year compared to the prior year.
    Kpis(KpiArgs),
    /// Forecast one indicator for one country.
    Forecast(ForecastArgs),
    /// Export a feature table (optionally filtered) as CSV or JSON.
    Export(ExportArgs),
    /// Compare the latest snapshot of several countries.
    Compare(CompareArgs),
    /// Correlations between indicators across the selected countries.
    Relationships(RelationshipsArgs),
    /// Write a synthetic World-Bank-style wide CSV.
    Sample(SampleArgs),
    /// Launch the interactive dashboard.
    ///
    /// Reads the persisted feature tables produced by `wdi build`.
    Tui(TuiArgs),
}

#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// Raw wide CSV (falls back to WDI_RAW_CSV, then an interactive picker).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Directory for the persisted tables (falls back to WDI_FEATURES_DIR).
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// How to fill gaps in each country's series.
    #[arg(long, value_enum, default_value_t = MissingStrategy::ForwardFill)]
    pub missing: MissingStrategy,

    /// Year used for the GDP/population ranks (default: latest year in the data).
    #[arg(long)]
    pub reference_year: Option<i32>,

    /// Rolling window (years) for the income-growth mean.
    #[arg(long, default_value_t = DEFAULT_ROLLING_WINDOW, value_parser = parse_window)]
    pub window: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    /// Raw wide CSV (falls back to WDI_RAW_CSV, then an interactive picker).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = MissingStrategy::ForwardFill)]
    pub missing: MissingStrategy,
}

/// Location of the persisted tables, shared by the read-side commands.
#[derive(Debug, Args, Clone)]
pub struct TablesArgs {
    /// Feature table directory (falls back to WDI_FEATURES_DIR).
    #[arg(long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct KpiArgs {
    #[command(flatten)]
    pub tables: TablesArgs,

    /// KPI year (default: latest year in the tables).
    #[arg(long)]
    pub year: Option<i32>,

    /// Start of the selected year range; decides which prior year is compared.
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Restrict to these countries (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub tables: TablesArgs,

    /// Country name as it appears in the tables.
    #[arg(short = 'c', long)]
    pub country: String,

    #[arg(short = 'i', long, value_parser = parse_indicator, default_value = "gdp_pc_usd")]
    pub indicator: Indicator,

    #[arg(short = 'm', long, value_enum, default_value_t = ForecastMethod::Linear)]
    pub method: ForecastMethod,

    /// Years to forecast past the last observation.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Render an ASCII plot under the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub tables: TablesArgs,

    #[arg(long, value_enum, default_value_t = ExportTable::Main)]
    pub table: ExportTable,

    /// Output format (default: from the output extension).
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// First year to keep (inclusive).
    #[arg(long = "from")]
    pub from_year: Option<i32>,

    /// Last year to keep (inclusive).
    #[arg(long = "to")]
    pub to_year: Option<i32>,

    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub tables: TablesArgs,

    /// Countries to compare (comma separated; default: all).
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RelationshipsArgs {
    #[command(flatten)]
    pub tables: TablesArgs,

    /// Year for the headline pairs (default: latest year in the tables).
    #[arg(long)]
    pub year: Option<i32>,

    /// Countries to include (comma separated; default: all).
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[arg(short = 'o', long = "out", value_name = "CSV", default_value = "data/raw/wdi_sample.csv")]
    pub output: PathBuf,

    /// Number of countries to include (taken from a fixed list).
    #[arg(long, default_value_t = 12)]
    pub countries: usize,

    #[arg(long, default_value_t = 2000)]
    pub start_year: i32,

    #[arg(long, default_value_t = 2022)]
    pub end_year: i32,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that any single cell is written as `..`.
    #[arg(long, default_value_t = 0.05)]
    pub missing_prob: f64,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub tables: TablesArgs,
}

fn parse_window(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("window must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_indicator(raw: &str) -> Result<Indicator, String> {
    Indicator::from_key(raw)
        .or_else(|| Indicator::from_series_code(raw))
        .or_else(|| <Indicator as ValueEnum>::from_str(raw, true).ok())
        .ok_or_else(|| {
            let keys: Vec<&str> = Indicator::ALL.iter().map(|i| i.key()).collect();
            format!("unknown indicator '{raw}' (expected one of: {})", keys.join(", "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_args_accept_keys_and_series_codes() {
        let cli = Cli::parse_from([
            "wdi",
            "forecast",
            "-c",
            "France",
            "-i",
            "SP.DYN.LE00.IN",
            "-m",
            "exp-smoothing",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.indicator, Indicator::LifeExpectancy);
        assert_eq!(args.method, ForecastMethod::ExpSmoothing);
        assert_eq!(args.horizon, DEFAULT_HORIZON);
    }

    #[test]
    fn short_indicator_names_parse() {
        assert_eq!(parse_indicator("life"), Ok(Indicator::LifeExpectancy));
        assert_eq!(parse_indicator("population_total"), Ok(Indicator::Population));
        assert!(parse_indicator("co2").is_err());
    }

    #[test]
    fn country_lists_split_on_commas() {
        let cli = Cli::parse_from(["wdi", "compare", "--countries", "France,Germany"]);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.countries, vec!["France", "Germany"]);
    }

    #[test]
    fn relationships_take_a_year_and_countries() {
        let cli = Cli::parse_from([
            "wdi",
            "relationships",
            "--year",
            "2019",
            "--countries",
            "Chile,Peru",
        ]);
        let Command::Relationships(args) = cli.command else {
            panic!("expected relationships");
        };
        assert_eq!(args.year, Some(2019));
        assert_eq!(args.countries, vec!["Chile", "Peru"]);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(Cli::try_parse_from(["wdi", "build", "--window", "0"]).is_err());
    }
}
