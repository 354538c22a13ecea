//! Feature engineering over the cleaned long table.
//!
//! `engineer_features` runs the stages in a fixed order:
//!
//! ```text
//! ranks -> rolling mean -> YoY -> snapshot + world aggregates
//! ```
//!
//! Ranks are attached to the base rows first; rolling and YoY are independent
//! of each other and of the rank columns.

pub mod aggregates;
pub mod ranks;
pub mod series;

use tracing::info;

use crate::domain::{FeatureRecord, FeatureTables, IndicatorRecord};

pub use aggregates::{compute_world_aggregates, create_latest_year_snapshot};
pub use ranks::{compute_ranks, min_rank_descending};
pub use series::{calculate_year_over_year_changes, compute_rolling_averages, pct_change};

pub const DEFAULT_ROLLING_WINDOW: usize = 3;

/// Build the three feature tables from cleaned records.
///
/// `reference_year` defaults to the latest year in `records`.
pub fn engineer_features(
    records: Vec<IndicatorRecord>,
    reference_year: Option<i32>,
    rolling_window: usize,
) -> FeatureTables {
    let mut main_data: Vec<FeatureRecord> =
        records.into_iter().map(FeatureRecord::from_base).collect();
    main_data.sort_by(|a, b| a.country().cmp(b.country()).then(a.year().cmp(&b.year())));

    let reference_year = reference_year.or_else(|| main_data.iter().map(FeatureRecord::year).max());
    if let Some(year) = reference_year {
        compute_ranks(&mut main_data, year);
    }
    compute_rolling_averages(&mut main_data, rolling_window);
    calculate_year_over_year_changes(&mut main_data);

    let latest_snapshot = create_latest_year_snapshot(&main_data);
    let world_aggregates = compute_world_aggregates(&main_data);

    info!(
        rows = main_data.len(),
        countries = latest_snapshot.len(),
        years = world_aggregates.len(),
        reference_year = ?reference_year,
        "engineered features"
    );

    FeatureTables {
        main_data,
        latest_snapshot,
        world_aggregates,
        rolling_window: rolling_window.max(1),
    }
}
