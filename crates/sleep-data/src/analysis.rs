//! End-to-end analysis pipeline.
//!
//! Loads every configured source, applies the time window, builds hourly
//! activity vectors and infers one [`SleepInterval`] per day, returning an
//! [`AnalysisResult`] ready for the report and chart sinks.

use chrono::NaiveDate;
use sleep_core::error::Result;
use sleep_core::inference::SleepInferrer;
use sleep_core::models::{DailyActivityVector, Event, SleepInterval, SleepSummary};
use sleep_core::settings::{AnalysisConfig, EmptyDayPolicy};
use tracing::{info, warn};

use crate::aggregator::HourlyAggregator;
use crate::filter::{filter_events, TimeWindow};
use crate::reader::load_all_sources;

// ── Public types ──────────────────────────────────────────────────────────────

/// Counts and timing gathered while running the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisMetadata {
    pub sources_loaded: usize,
    /// Events extracted from all sources before filtering.
    pub events_loaded: usize,
    /// Events left after the time window was applied.
    pub events_in_range: usize,
    /// Wall-clock seconds spent reading and extracting sources.
    pub load_time_seconds: f64,
}

/// The complete output of [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Hourly vectors, date ascending.
    pub days: Vec<DailyActivityVector>,
    /// One interval per entry of `days`, same order.
    pub intervals: Vec<SleepInterval>,
    pub summary: SleepSummary,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline for `config`.
///
/// Fails when any source cannot be read or parsed; an empty result (no events
/// in range) is not an error.
pub fn analyze(config: &AnalysisConfig) -> Result<AnalysisResult> {
    let load_start = std::time::Instant::now();
    let events = load_all_sources(&config.sources, &config.timezone)?;
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} events from {} sources",
        events.len(),
        config.sources.len()
    );

    let mut result = analyze_events(events, config)?;
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Run the pipeline on already-normalized events.
pub fn analyze_events(events: Vec<Event>, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let events_loaded = events.len();

    // ── Step 1: Window ────────────────────────────────────────────────────────
    let window = TimeWindow::from_config(config)?;
    let events = filter_events(events, &window);
    if events.is_empty() {
        warn!("No events fall inside the configured date range");
    }

    // ── Step 2: Hourly vectors ────────────────────────────────────────────────
    let mut days = HourlyAggregator::aggregate(&events);
    if config.empty_days == EmptyDayPolicy::Inactive {
        if let Some((first, last)) = calendar_span(&window, &days) {
            days = HourlyAggregator::fill_calendar(days, first, last);
        }
    }

    // ── Step 3: Inference ─────────────────────────────────────────────────────
    let inferrer = SleepInferrer::new(config.min_inactive_hours);
    let intervals = inferrer.infer_all(&days);
    let summary = SleepSummary::from_intervals(&intervals);

    info!(
        "Inferred sleep on {} of {} days",
        summary.days_with_sleep, summary.days_analyzed
    );

    let metadata = AnalysisMetadata {
        sources_loaded: config.sources.len(),
        events_loaded,
        events_in_range: events.len(),
        load_time_seconds: 0.0,
    };

    Ok(AnalysisResult {
        days,
        intervals,
        summary,
        metadata,
    })
}

/// Dates to represent under [`EmptyDayPolicy::Inactive`]: the window bounds
/// where set, otherwise the first/last observed date.
fn calendar_span(window: &TimeWindow, days: &[DailyActivityVector]) -> Option<(NaiveDate, NaiveDate)> {
    let first = window
        .start
        .map(|s| s.date_naive())
        .or_else(|| days.first().map(|d| d.date))?;
    let last = window
        .end
        .map(|e| e.date_naive())
        .or_else(|| days.last().map(|d| d.date))?;
    Some((first, last))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
