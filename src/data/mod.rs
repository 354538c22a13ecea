//! Demo data generation.

pub mod sample;
