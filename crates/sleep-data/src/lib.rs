//! Data ingestion layer for browse-sleep.
//!
//! Reads the configured browser history exports, normalizes their entries
//! into reference-zone events, applies the analysis window, aggregates hourly
//! activity and runs the inference pipeline.

pub mod adapter;
pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use sleep_core as core;
