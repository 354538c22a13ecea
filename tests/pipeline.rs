//! End-to-end: raw wide CSV on disk -> pipeline -> persisted tables -> cache -> queries.

use std::fmt::Write as _;
use std::path::Path;

use approx::assert_abs_diff_eq;
use wdi_dash::app::default_pipeline_config;
use wdi_dash::app::pipeline::{persist, run_pipeline};
use wdi_dash::domain::{ForecastMethod, Indicator, PointKind};
use wdi_dash::io::{ExportFormat, ExportTable, export_table};
use wdi_dash::query::{
    RowFilter, Strength, compare_countries, compute_kpis, correlations, forecast_for,
    previous_year_for,
};
use wdi_dash::store::TableCache;

const YEARS: std::ops::RangeInclusive<i32> = 2015..=2020;

fn series_row(
    out: &mut String,
    country: &str,
    code: &str,
    series: &str,
    cells: impl Fn(i32) -> String,
) {
    write!(out, "\"{country}\",{code},name,{series}").unwrap();
    for year in YEARS {
        write!(out, ",{}", cells(year)).unwrap();
    }
    out.push('\n');
}

fn write_raw(path: &Path) {
    let mut csv = String::from("Country Name,Country Code,Series Name,Series Code");
    for year in YEARS {
        write!(csv, ",{year} [YR{year}]").unwrap();
    }
    csv.push('\n');

    let t = |y: i32| (y - 2015) as f64;
    // France
    series_row(&mut csv, "France", "FRA", "NY.GDP.PCAP.CD", |y| {
        (40_000.0 + 1_000.0 * t(y)).to_string()
    });
    series_row(&mut csv, "France", "FRA", "SP.POP.TOTL", |_| "67000000".into());
    series_row(&mut csv, "France", "FRA", "SP.DYN.LE00.IN", |y| (82.0 + 0.5 * t(y)).to_string());
    series_row(&mut csv, "France", "FRA", "NY.ADJ.NNTY.PC.KD.ZG", |_| "1.0".into());
    // Egypt, with a gap in 2017 GDP
    series_row(&mut csv, "Egypt, Arab Rep.", "EGY", "NY.GDP.PCAP.CD", |y| {
        if y == 2017 { "..".into() } else { (3_000.0 + 100.0 * t(y)).to_string() }
    });
    series_row(&mut csv, "Egypt, Arab Rep.", "EGY", "SP.POP.TOTL", |_| "100000000".into());
    series_row(&mut csv, "Egypt, Arab Rep.", "EGY", "SP.DYN.LE00.IN", |_| "71".into());
    series_row(&mut csv, "Egypt, Arab Rep.", "EGY", "NY.ADJ.NNTY.PC.KD.ZG", |_| "2.0".into());
    // An aggregate row the registry cannot resolve
    series_row(&mut csv, "World", "WLD", "NY.GDP.PCAP.CD", |y| {
        (11_000.0 + 500.0 * t(y)).to_string()
    });
    series_row(&mut csv, "World", "WLD", "SP.POP.TOTL", |_| "7500000000".into());
    // Unrecognized series is ignored
    series_row(&mut csv, "France", "FRA", "EN.ATM.CO2E.PC", |_| "4.5".into());

    csv.push_str(",,,,\n");
    csv.push_str("Data from database: World Development Indicators\n");
    csv.push_str("Last Updated: 01/01/2024\n");
    std::fs::write(path, csv).unwrap();
}

#[test]
fn raw_csv_to_dashboard_queries() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let features_dir = dir.path().join("features");
    write_raw(&raw);

    let config = default_pipeline_config(raw, features_dir.clone());
    let output = run_pipeline(&config).unwrap();

    // Cleaning
    assert_eq!(output.clean.standardize.unresolved, vec!["World".to_string()]);
    assert_eq!(output.reference_year, Some(2020));
    let egypt_2017 = output
        .clean
        .cleaned
        .iter()
        .find(|r| r.country == "Egypt, Arab Rep." && r.year == 2017)
        .unwrap();
    assert_eq!(egypt_2017.iso_code.as_deref(), Some("EGY"));
    assert_eq!(egypt_2017.gdp_pc_usd, Some(3_100.0));
    assert!(output.clean.validation.is_valid());

    // Features
    let tables = &output.tables;
    assert_eq!(tables.main_data.len(), 18);
    assert_eq!(tables.latest_snapshot.len(), 3);
    assert!(tables.latest_snapshot.iter().all(|r| r.year() == 2020));
    assert_eq!(tables.world_aggregates.len(), 6);
    for row in tables.main_data.iter().filter(|r| r.country() == "France") {
        assert_eq!(row.gdp_pc_rank, Some(1));
    }
    let france_2016 = tables
        .main_data
        .iter()
        .find(|r| r.country() == "France" && r.year() == 2016)
        .unwrap();
    assert_abs_diff_eq!(france_2016.gdp_pc_usd_yoy_pct.unwrap(), 2.5, epsilon = 1e-9);

    // Persist and reload through the cache
    let written = persist(&output, &config).unwrap();
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|p| p.exists()));

    let cache = TableCache::new(&features_dir);
    let loaded = cache.get_or_load().unwrap();
    assert_eq!(*loaded, output.tables);
    assert_eq!(cache.load_count(), 1);

    // KPIs
    let kpis = compute_kpis(&loaded.main_data, 2020, previous_year_for(2020, 2015));
    assert_eq!(kpis.previous_year, 2019);
    let population = kpis.kpis.iter().find(|k| k.indicator == Indicator::Population).unwrap();
    assert_abs_diff_eq!(population.value.unwrap(), 7_667_000_000.0);
    assert_eq!(population.formatted_delta(), "+0.0%");

    // Compare
    let names: Vec<_> = compare_countries(&loaded, &[])
        .iter()
        .map(|r| r.country().to_string())
        .collect();
    assert_eq!(names, vec!["France", "World", "Egypt, Arab Rep."]);

    // Relationships: World has no life expectancy, so only two GDP/life pairs
    let rels = correlations(&loaded.main_data, 2020, &[]);
    assert_eq!(rels[0].pairs, 2);
    assert_eq!(rels[0].strength(), Some(Strength::StrongPositive));
    assert_eq!(rels[1].pairs, 2);
    assert_abs_diff_eq!(rels[1].r.unwrap(), -1.0, epsilon = 1e-12);
    assert_eq!(rels[2].pairs, 3);

    // Forecast: both methods return the same shape
    for method in [ForecastMethod::Linear, ForecastMethod::ExpSmoothing] {
        let result = forecast_for(&loaded, "France", Indicator::GdpPerCapita, method, 5).unwrap();
        assert_eq!(result.historical().count(), 6);
        let years: Vec<i32> = result.forecast().map(|p| p.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023, 2024, 2025]);
        assert!(result.points.iter().all(|p| p.value.is_finite()));
        assert_eq!(result.points.last().map(|p| p.kind), Some(PointKind::Forecast));
    }
    let linear =
        forecast_for(&loaded, "France", Indicator::GdpPerCapita, ForecastMethod::Linear, 1)
            .unwrap();
    assert_abs_diff_eq!(linear.forecast().next().unwrap().value, 46_000.0, epsilon = 1e-6);

    // Export
    let out = dir.path().join("egypt.json");
    let filter = RowFilter::new(vec!["Egypt, Arab Rep.".into()], Some((2019, 2020)));
    let n = export_table(&out, &loaded, ExportTable::Main, &filter, ExportFormat::Json).unwrap();
    assert_eq!(n, 2);
}

#[test]
fn missing_series_codes_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let csv = "Country Name,Country Code,Series Name,Series Code,2020 [YR2020]\n\
               France,FRA,x,XX.UNKNOWN,1\n";
    std::fs::write(&raw, csv).unwrap();

    let err = run_pipeline(&default_pipeline_config(raw, dir.path().join("out"))).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
