//! Configuration of the browser logs fed into the pipeline.
//!
//! Every source names its [`LogFormat`] explicitly; the format supplies a
//! default [`LogSchema`] whose field paths, unit and epoch may each be
//! overridden per source.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::time_utils::{EpochBase, TimeUnit};

/// Known source log layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Chrome session export: `Session[].tab.navigation[]` with `timestamp_msec`.
    #[value(name = "chrome_sessions")]
    ChromeSessions,
    /// Google Takeout `History.json`: `Browser History[]` with `time_usec`.
    #[value(name = "chrome_takeout")]
    ChromeTakeout,
    /// Safari history export: `history[]` with `time_usec`.
    #[value(name = "safari_history")]
    SafariHistory,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::ChromeSessions => "chrome_sessions",
            LogFormat::ChromeTakeout => "chrome_takeout",
            LogFormat::SafariHistory => "safari_history",
        }
    }

    /// Field paths, unit and epoch this layout uses out of the box.
    pub fn default_schema(&self) -> LogSchema {
        match self {
            LogFormat::ChromeSessions => LogSchema {
                entries: "Session[].tab.navigation[]".to_string(),
                timestamp: "timestamp_msec".to_string(),
                url: Some("virtual_url".to_string()),
                title: Some("title".to_string()),
                unit: TimeUnit::Milliseconds,
                epoch: EpochBase::Unix,
            },
            LogFormat::ChromeTakeout => LogSchema {
                entries: "Browser History[]".to_string(),
                timestamp: "time_usec".to_string(),
                url: Some("url".to_string()),
                title: Some("title".to_string()),
                unit: TimeUnit::Microseconds,
                epoch: EpochBase::Unix,
            },
            LogFormat::SafariHistory => LogSchema {
                entries: "history[]".to_string(),
                timestamp: "time_usec".to_string(),
                url: Some("url".to_string()),
                title: Some("title".to_string()),
                unit: TimeUnit::Microseconds,
                epoch: EpochBase::Unix,
            },
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to find events inside one source document.
///
/// `entries` is a path whose `[]` segments iterate arrays; the other paths
/// are plain dotted keys resolved inside each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSchema {
    pub entries: String,
    pub timestamp: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub unit: TimeUnit,
    pub epoch: EpochBase,
}

/// Per-source replacements for any part of the format's default schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<EpochBase>,
}

/// One configured source log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name carried on every event from this source.
    pub name: String,
    pub path: PathBuf,
    pub format: LogFormat,
    #[serde(flatten)]
    pub overrides: SchemaOverrides,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
            overrides: SchemaOverrides::default(),
        }
    }

    /// The format's default schema with this source's overrides applied.
    pub fn schema(&self) -> LogSchema {
        let mut schema = self.format.default_schema();
        let o = &self.overrides;
        if let Some(entries) = &o.entries {
            schema.entries = entries.clone();
        }
        if let Some(timestamp) = &o.timestamp {
            schema.timestamp = timestamp.clone();
        }
        if o.url.is_some() {
            schema.url = o.url.clone();
        }
        if o.title.is_some() {
            schema.title = o.title.clone();
        }
        if let Some(unit) = o.unit {
            schema.unit = unit;
        }
        if let Some(epoch) = o.epoch {
            schema.epoch = epoch;
        }
        schema
    }
}
