//! Schema-driven extraction of [`Event`]s from parsed source documents.
//!
//! A [`SchemaAdapter`] walks the document along its configured entries path
//! and converts each entry's timestamp into the reference timezone.

use std::fmt;

use serde_json::Value;
use sleep_core::error::{Result, SleepError};
use sleep_core::models::Event;
use sleep_core::source_config::{LogSchema, SourceConfig};
use sleep_core::time_utils::{EpochBase, TimeUnit, TimezoneHandler};
use tracing::debug;

// ── FieldPath ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Each,
}

/// A parsed dotted path such as `Session[].tab.navigation[]`.
///
/// A `[]` suffix on a key, or a bare `[]`, iterates an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SleepError::InvalidFieldPath("empty path".to_string()));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            let (key, each) = match part.strip_suffix("[]") {
                Some(key) => (key, true),
                None => (part, false),
            };
            if key.contains('[') || key.contains(']') {
                return Err(SleepError::InvalidFieldPath(format!(
                    "unexpected bracket in \"{}\"",
                    raw
                )));
            }
            if key.is_empty() && !each {
                return Err(SleepError::InvalidFieldPath(format!(
                    "empty segment in \"{}\"",
                    raw
                )));
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }
            if each {
                segments.push(Segment::Each);
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Parse a path that must resolve to a single value (no `[]`).
    pub fn parse_scalar(raw: &str) -> Result<Self> {
        let path = Self::parse(raw)?;
        if path.segments.contains(&Segment::Each) {
            return Err(SleepError::InvalidFieldPath(format!(
                "\"{}\" must not iterate arrays",
                raw
            )));
        }
        Ok(path)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve a scalar path inside `value`.
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(value, |current, segment| match segment {
            Segment::Key(key) => current.get(key.as_str()),
            Segment::Each => None,
        })
    }

    /// Every value reachable along the path; branches with missing keys or
    /// non-array values under `[]` contribute nothing.
    pub fn collect<'a>(&self, value: &'a Value) -> Vec<&'a Value> {
        let mut out = Vec::new();
        collect_into(value, &self.segments, &mut out);
        out
    }

    /// The document-level segment a source must provide, for error messages.
    fn root_key(&self) -> &str {
        match self.segments.first() {
            Some(Segment::Key(key)) => key,
            _ => "[]",
        }
    }

    /// Whether `document` has the path's root (an array where one is iterated).
    fn root_present(&self, document: &Value) -> bool {
        match self.segments.as_slice() {
            [Segment::Each, ..] => document.is_array(),
            [Segment::Key(key), Segment::Each, ..] => {
                document.get(key.as_str()).is_some_and(Value::is_array)
            }
            [Segment::Key(key), ..] => document.get(key.as_str()).is_some(),
            [] => true,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn collect_into<'a>(value: &'a Value, segments: &[Segment], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match head {
        Segment::Key(key) => {
            if let Some(child) = value.get(key.as_str()) {
                collect_into(child, rest, out);
            }
        }
        Segment::Each => {
            if let Some(items) = value.as_array() {
                for item in items {
                    collect_into(item, rest, out);
                }
            }
        }
    }
}

// ── LogAdapter ────────────────────────────────────────────────────────────────

/// Turns one parsed source document into normalized events.
pub trait LogAdapter {
    /// Name stamped on every produced event.
    fn source_name(&self) -> &str;

    /// Extract all events with a usable timestamp from `document`.
    fn extract(&self, document: &Value, tz: &TimezoneHandler) -> Result<Vec<Event>>;
}

/// [`LogAdapter`] driven by a [`LogSchema`].
#[derive(Debug, Clone)]
pub struct SchemaAdapter {
    source_name: String,
    entries: FieldPath,
    timestamp: FieldPath,
    url: Option<FieldPath>,
    title: Option<FieldPath>,
    unit: TimeUnit,
    epoch: EpochBase,
}

impl SchemaAdapter {
    pub fn new(source_name: impl Into<String>, schema: &LogSchema) -> Result<Self> {
        Ok(Self {
            source_name: source_name.into(),
            entries: FieldPath::parse(&schema.entries)?,
            timestamp: FieldPath::parse_scalar(&schema.timestamp)?,
            url: schema.url.as_deref().map(FieldPath::parse_scalar).transpose()?,
            title: schema.title.as_deref().map(FieldPath::parse_scalar).transpose()?,
            unit: schema.unit,
            epoch: schema.epoch,
        })
    }

    /// Build the adapter for a configured source, overrides applied.
    pub fn from_source(source: &SourceConfig) -> Result<Self> {
        Self::new(source.name.clone(), &source.schema())
    }

    fn text_field(path: Option<&FieldPath>, entry: &Value) -> Option<String> {
        path.and_then(|p| p.get(entry))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl LogAdapter for SchemaAdapter {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn extract(&self, document: &Value, tz: &TimezoneHandler) -> Result<Vec<Event>> {
        if !self.entries.root_present(document) {
            return Err(SleepError::MissingRootKey {
                source_name: self.source_name.clone(),
                key: self.entries.root_key().to_string(),
            });
        }

        let entries = self.entries.collect(document);
        let mut events = Vec::with_capacity(entries.len());
        let mut skipped = 0usize;

        for entry in entries {
            let timestamp = self
                .timestamp
                .get(entry)
                .and_then(|raw| tz.convert_epoch(raw, self.unit, self.epoch));
            let Some(timestamp) = timestamp else {
                skipped += 1;
                continue;
            };

            let mut event = Event::new(timestamp, self.source_name.as_str());
            event.url = Self::text_field(self.url.as_ref(), entry);
            event.title = Self::text_field(self.title.as_ref(), entry);
            events.push(event);
        }

        if skipped > 0 {
            debug!(
                "{}: skipped {} entries without a usable \"{}\"",
                self.source_name, skipped, self.timestamp
            );
        }
        debug!("{}: extracted {} events", self.source_name, events.len());

        Ok(events)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
