//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the indicator enumeration (`Indicator`) with keys, labels and formatting
//! - long-table rows (`IndicatorRecord`, `FeatureRecord`, `WorldAggregate`)
//! - forecast outputs (`ForecastPoint`) and run configuration (`PipelineConfig`)

pub mod types;

pub use types::*;
