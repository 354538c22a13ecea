//! `wdi-dash` library crate.
//!
//! The binary (`wdi`) is a thin wrapper around this library so that:
//!
//! - the pipeline and queries are testable without spawning processes
//! - the dashboard and CLI share one implementation of every computation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod clean;
pub mod cli;
pub mod config;
pub mod countries;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod query;
pub mod report;
pub mod store;
pub mod tui;
