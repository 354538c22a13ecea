//! ISO 3166-1 registry and country-code standardization.

pub mod registry;
pub mod standardize;

pub use registry::CountryEntry;
pub use standardize::{Resolution, StandardizeReport, resolve_code, standardize_country_codes};
