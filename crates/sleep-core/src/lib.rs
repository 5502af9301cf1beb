//! Core types for browse-sleep.
//!
//! Holds the domain models (events, hourly activity vectors, sleep
//! intervals), the sleep inference algorithm, timezone handling, source and
//! CLI configuration, and the shared error type used by every other crate.

pub mod error;
pub mod formatting;
pub mod inference;
pub mod models;
pub mod settings;
pub mod source_config;
pub mod time_utils;

pub use error::{Result, SleepError};
pub use inference::SleepInferrer;
pub use models::{DailyActivityVector, Event, SleepBlock, SleepInterval, SleepSummary};
