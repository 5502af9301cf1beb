//! Loading of configured source logs.
//!
//! Each source is one JSON document read through a scoped buffered handle and
//! handed to its [`SchemaAdapter`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use sleep_core::error::{Result, SleepError};
use sleep_core::models::Event;
use sleep_core::source_config::SourceConfig;
use sleep_core::time_utils::TimezoneHandler;
use tracing::debug;

use crate::adapter::{LogAdapter, SchemaAdapter};

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and parse one JSON document.
pub fn read_document(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|source| SleepError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| SleepError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load all events of a single source.
pub fn load_source(source: &SourceConfig, tz: &TimezoneHandler) -> Result<Vec<Event>> {
    let adapter = SchemaAdapter::from_source(source)?;
    let document = read_document(&source.path)?;
    let events = adapter.extract(&document, tz)?;
    debug!(
        "Loaded {} events from {} ({}, {})",
        events.len(),
        source.path.display(),
        source.name,
        source.format
    );
    Ok(events)
}

/// Load every source into one combined event list.
///
/// Any failing source aborts the whole load; a partial event set is never
/// returned.
pub fn load_all_sources(sources: &[SourceConfig], tz: &TimezoneHandler) -> Result<Vec<Event>> {
    let mut all_events = Vec::new();
    for source in sources {
        all_events.extend(load_source(source, tz)?);
    }
    all_events.sort_by_key(|e| e.timestamp);

    debug!(
        "Processed {} events from {} sources",
        all_events.len(),
        sources.len()
    );
    Ok(all_events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
