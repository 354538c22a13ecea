//! Row selection by country set and year range.

use std::collections::BTreeSet;

use crate::domain::{FeatureRecord, WorldAggregate};

/// Country set plus inclusive year range. Empty/absent parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub countries: Vec<String>,
    pub years: Option<(i32, i32)>,
}

impl RowFilter {
    pub fn new(countries: Vec<String>, years: Option<(i32, i32)>) -> Self {
        // Accept reversed bounds.
        let years = years.map(|(a, b)| (a.min(b), a.max(b)));
        Self { countries, years }
    }

    pub fn matches_country(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|c| c == country)
    }

    pub fn matches_year(&self, year: i32) -> bool {
        self.years.is_none_or(|(start, end)| (start..=end).contains(&year))
    }

    pub fn matches(&self, row: &FeatureRecord) -> bool {
        self.matches_country(row.country()) && self.matches_year(row.year())
    }
}

/// Independent copies of the matching rows; the source table is never touched.
pub fn filter_rows(rows: &[FeatureRecord], filter: &RowFilter) -> Vec<FeatureRecord> {
    rows.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// World rows are filtered by year only.
pub fn filter_world(rows: &[WorldAggregate], filter: &RowFilter) -> Vec<WorldAggregate> {
    rows.iter().filter(|r| filter.matches_year(r.year)).cloned().collect()
}

pub fn available_countries(rows: &[FeatureRecord]) -> Vec<String> {
    rows.iter()
        .map(|r| r.country().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn available_years(rows: &[FeatureRecord]) -> Vec<i32> {
    rows.iter()
        .map(FeatureRecord::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
