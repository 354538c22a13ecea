//! Post-reshape cleaning: gap filling and validation.

pub mod missing;
pub mod validate;

pub use missing::{drop_empty_rows, handle_missing_values};
pub use validate::{
    CheckStatus, MissingStat, ValidationCheck, ValidationReport, missing_data_stats, validate,
};
