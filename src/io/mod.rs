//! Input/output helpers.
//!
//! - wide CSV ingest + reshape (`ingest`)
//! - persisted feature tables (`tables`)
//! - filtered CSV/JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod tables;

pub use export::*;
pub use ingest::*;
pub use tables::*;
