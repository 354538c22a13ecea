//! Math utilities.
//!
//! - Least-squares solve and line fitting (`ols`)

pub mod ols;

pub use ols::*;
