//! In-process storage of loaded tables.

pub mod cache;

pub use cache::TableCache;
