//! Output layer for browse-sleep.
//!
//! Writes the per-date report (CSV or JSON) and the SVG Gantt chart, and
//! provides the interactive terminal viewer built on [`ratatui`].

pub mod app;
pub mod export;
pub mod gantt_view;
pub mod svg_chart;
pub mod table_view;
pub mod themes;

pub use sleep_core as core;
