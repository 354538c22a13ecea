//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and query code stays free of presentation concerns
//! - output changes are localized (important for future snapshot tests)

use std::path::PathBuf;

use crate::app::pipeline::{CleanOutput, PipelineOutput};
use crate::clean::{CheckStatus, MissingStat, ValidationReport};
use crate::domain::{FeatureRecord, Indicator, PointKind};
use crate::forecast::ForecastResult;
use crate::query::{CorrelationMatrix, KpiSummary, Relationship};

/// Dataset summary printed by `wdi build` and `wdi validate`.
pub fn format_clean_summary(clean: &CleanOutput) -> String {
    let mut out = String::new();

    out.push_str("=== wdi - World Development Indicators pipeline ===\n");
    out.push_str(&format!(
        "Rows read: {} | footer rows: {} | unreadable rows: {}\n",
        clean.rows_read,
        clean.footer_rows,
        clean.row_errors.len()
    ));
    let found: Vec<&str> = clean.indicators_found.iter().map(|i| i.short_label()).collect();
    out.push_str(&format!("Indicators: {}\n", found.join(", ")));
    out.push_str(&format!(
        "Series rows used: {} | ignored: {} | `..` cells: {} | non-numeric cells: {}\n",
        clean.reshape.series_rows_used,
        clean.reshape.series_rows_ignored,
        clean.reshape.no_data_cells,
        clean.reshape.non_numeric_cells
    ));

    let countries = clean
        .cleaned
        .iter()
        .map(|r| r.country.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let years: Vec<i32> = clean.cleaned.iter().map(|r| r.year).collect();
    let (min_year, max_year) = (years.iter().min(), years.iter().max());
    out.push_str(&format!(
        "Cleaned table: {} rows | {} countries | years {}-{} | dropped empty rows: {}\n",
        clean.cleaned.len(),
        countries,
        min_year.map_or("?".to_string(), |y| y.to_string()),
        max_year.map_or("?".to_string(), |y| y.to_string()),
        clean.dropped_rows
    ));

    if !clean.standardize.unresolved.is_empty() {
        out.push_str(&format!(
            "Unresolved country codes ({}): {}\n",
            clean.standardize.unresolved.len(),
            clean.standardize.unresolved.join("; ")
        ));
    }
    out.push('\n');

    out.push_str(&format_validation(&clean.validation));
    out.push('\n');
    out.push_str(&format_missing_stats(&clean.missing_stats));
    out
}

/// `build` summary: dataset stats, reference year and files written.
pub fn format_build_summary(output: &PipelineOutput, written: &[PathBuf]) -> String {
    let mut out = format_clean_summary(&output.clean);
    out.push('\n');
    out.push_str(&format!(
        "Features: reference year {} | rolling window {}y | {} snapshot rows | {} world rows\n",
        output.reference_year.map_or("-".to_string(), |y| y.to_string()),
        output.tables.rolling_window,
        output.tables.latest_snapshot.len(),
        output.tables.world_aggregates.len()
    ));
    out.push_str("Wrote:\n");
    for path in written {
        out.push_str(&format!("- {}\n", path.display()));
    }
    out
}

pub fn format_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Data validation: {}\n",
        if report.is_valid() { "PASS" } else { "FAIL" }
    ));
    out.push_str(&format!("{:<38} {:>8} {:<8}\n", "check", "count", "status").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<38} {:-<8} {:-<8}", "", "", ""));
    out.push('\n');
    for c in &report.checks {
        let marker = if c.status == CheckStatus::Error { "!" } else { "" };
        out.push_str(&format!("{:<38} {:>8} {}{}\n", c.check, c.count, c.status.as_str(), marker));
    }
    out
}

pub fn format_missing_stats(stats: &[MissingStat]) -> String {
    let mut out = String::from("Missing data after cleaning:\n");
    out.push_str(&format!("{:<28} {:>8} {:>8} {:>8}\n", "column", "present", "missing", "pct"));
    for s in stats {
        out.push_str(&format!(
            "{:<28} {:>8} {:>8} {:>7.1}%\n",
            s.column, s.total_values, s.missing_values, s.missing_pct
        ));
    }
    out
}

pub fn format_kpis(summary: &KpiSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("KPIs for {} (vs {}):\n", summary.year, summary.previous_year));
    for k in &summary.kpis {
        let line = format!(
            "{:<24} {:>14} {:>12}",
            k.label,
            k.formatted_value(),
            k.formatted_delta()
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Country comparison table over snapshot rows.
pub fn format_compare(rows: &[FeatureRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>6} {:>14} {:>8} {:>12} {:>10} {:>8} {:>8}\n",
            "country", "year", "gdp_pc", "gdp_rank", "life_exp", "population", "pop_rank", "growth"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<28} {:-<6} {:-<14} {:-<8} {:-<12} {:-<10} {:-<8} {:-<8}\n",
        "", "", "", "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(
            format!(
                "{:<28} {:>6} {:>14} {:>8} {:>12} {:>10} {:>8} {:>8}\n",
                truncate(r.country(), 28),
                r.year(),
                Indicator::GdpPerCapita.format_value(r.value(Indicator::GdpPerCapita)),
                fmt_rank(r.gdp_pc_rank),
                Indicator::LifeExpectancy.format_value(r.value(Indicator::LifeExpectancy)),
                Indicator::Population.format_value(r.value(Indicator::Population)),
                fmt_rank(r.population_rank),
                Indicator::IncomeGrowth.format_value(r.value(Indicator::IncomeGrowth)),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Headline correlations for one year followed by the all-years matrix.
pub fn format_relationships(
    year: i32,
    pairs: &[Relationship],
    matrix: &CorrelationMatrix,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Relationships in {year}:\n"));
    for rel in pairs {
        let (r, strength) = match (rel.r, rel.strength()) {
            (Some(r), Some(s)) => (format!("{r:.2}"), s.label()),
            _ => ("N/A".to_string(), "not enough data"),
        };
        out.push_str(&format!("{:<24} {:>6}  {:<18} n={}\n", rel.label, r, strength, rel.pairs));
    }

    out.push_str(&format!(
        "\nCorrelation matrix (all years, {} complete rows):\n",
        matrix.rows_used
    ));
    out.push_str(&format!("{:<12}", ""));
    for ind in &matrix.indicators {
        out.push_str(&format!(" {:>11}", ind.short_label()));
    }
    out.push('\n');
    for (ind, row) in matrix.indicators.iter().zip(&matrix.values) {
        out.push_str(&format!("{:<12}", ind.short_label()));
        for v in row {
            let cell = v.map_or("N/A".to_string(), |r| format!("{r:.2}"));
            out.push_str(&format!(" {cell:>11}"));
        }
        out.push('\n');
    }
    out
}

pub fn format_forecast(result: &ForecastResult) -> String {
    let ind = result.indicator;
    let mut out = String::new();
    out.push_str(&format!("{} forecast for {}\n", ind.label(), result.country));
    out.push_str(&format!("Method: {}", result.method.display_name()));
    if let Some(reason) = &result.fallback {
        out.push_str(&format!(" (fell back to linear regression: {reason})"));
    }
    out.push('\n');
    if let Some(band) = result.band {
        out.push_str(&format!("Band: ±{}\n", fmt_plain(ind, band)));
    }

    let last_hist = result.historical().last();
    let last_fc = result.forecast().last();
    if let (Some(h), Some(f)) = (last_hist, last_fc) {
        let change = crate::features::pct_change(h.value, f.value)
            .map_or("N/A".to_string(), |c| format!("{c:+.1}%"));
        out.push_str(&format!(
            "Last observed {}: {} | {}: {} ({change})\n",
            h.year,
            ind.format_value(Some(h.value)),
            f.year,
            ind.format_value(Some(f.value))
        ));
    }
    out.push('\n');

    out.push_str(&format!("{:>6} {:>16} {:<10}\n", "year", "value", "type"));
    for p in &result.points {
        let marker = match p.kind {
            PointKind::Historical => "",
            PointKind::Forecast => "*",
        };
        out.push_str(&format!(
            "{:>6} {:>16} {}{}\n",
            p.year,
            ind.format_value(Some(p.value)),
            p.kind.label(),
            marker
        ));
    }
    out
}

fn fmt_rank(rank: Option<u32>) -> String {
    rank.map_or("-".to_string(), |r| r.to_string())
}

/// The indicator's format without the currency/abbreviation decoration for small bands.
fn fmt_plain(ind: Indicator, v: f64) -> String {
    match ind {
        Indicator::LifeExpectancy | Indicator::IncomeGrowth => format!("{v:.2}"),
        _ => ind.format_value(Some(v)),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::validate;
    use crate::domain::{ForecastMethod, ForecastPoint, IndicatorRecord};

    #[test]
    fn validation_report_lists_every_check() {
        let mut r = IndicatorRecord::new("X", None, 2020).with(Indicator::LifeExpectancy, 150.0);
        r.population_total = Some(-1.0);
        let text = format_validation(&validate(&[r]));
        assert!(text.starts_with("Data validation: FAIL"));
        assert!(text.contains("Negative population values"));
        assert!(text.contains("ERROR!"));
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn compare_table_uses_indicator_formats() {
        let mut row = FeatureRecord::from_base(
            IndicatorRecord::new("France", Some("FRA".into()), 2022)
                .with(Indicator::GdpPerCapita, 40_886.3)
                .with(Indicator::Population, 67_970_000.0),
        );
        row.gdp_pc_rank = Some(2);
        let text = format_compare(&[row]);
        assert!(text.contains("$40,886"));
        assert!(text.contains("68.0M"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn forecast_report_marks_forecast_rows_and_fallback() {
        let result = ForecastResult {
            country: "France".into(),
            indicator: Indicator::LifeExpectancy,
            method: ForecastMethod::ExpSmoothing,
            points: vec![
                ForecastPoint { year: 2020, value: 80.0, kind: PointKind::Historical },
                ForecastPoint { year: 2021, value: 82.0, kind: PointKind::Historical },
                ForecastPoint { year: 2022, value: 84.0, kind: PointKind::Forecast },
            ],
            fallback: Some("need at least 5 points, got 2".into()),
            band: Some(1.414),
        };
        let text = format_forecast(&result);
        assert!(text.contains("fell back to linear regression"));
        assert!(text.contains("Forecast*"));
        assert!(text.contains("84.0 yrs"));
        assert!(text.contains("Band: ±1.41"));
    }

    #[test]
    fn relationships_report_shows_strength_and_gaps() {
        let rows: Vec<FeatureRecord> = [(1_000.0, 60.0), (2_000.0, 70.0)]
            .iter()
            .enumerate()
            .map(|(i, &(gdp, life))| {
                FeatureRecord::from_base(
                    IndicatorRecord::new(format!("C{i}"), None, 2020)
                        .with(Indicator::GdpPerCapita, gdp)
                        .with(Indicator::LifeExpectancy, life),
                )
            })
            .collect();
        let pairs = crate::query::correlations(&rows, 2020, &[]);
        let matrix = crate::query::correlation_matrix(&rows, &[]);
        let text = format_relationships(2020, &pairs, &matrix);

        assert!(text.starts_with("Relationships in 2020:"));
        assert!(text.contains("GDP vs Life Expectancy"));
        assert!(text.contains("1.00  Strong positive"));
        assert!(text.contains("not enough data"));
        assert!(text.contains("0 complete rows"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
