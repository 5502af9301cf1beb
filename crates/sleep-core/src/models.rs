use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Number of hourly buckets in one day's activity vector.
pub const HOURS_PER_DAY: usize = 24;

/// A single browsing action read from a source log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// When the action happened, already expressed in the reference timezone.
    pub timestamp: DateTime<Tz>,
    /// Configured name of the source that produced it (e.g. `"chrome"`).
    pub source: String,
    /// Visited URL, when the log carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Page title, when the log carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Event {
    /// Build an event without URL/title metadata.
    pub fn new(timestamp: DateTime<Tz>, source: impl Into<String>) -> Self {
        Self {
            timestamp,
            source: source.into(),
            url: None,
            title: None,
        }
    }

    /// Calendar date of the event in the reference timezone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Hour of day (0-23) of the event in the reference timezone.
    pub fn hour(&self) -> usize {
        self.timestamp.hour() as usize
    }
}

/// One calendar day's hourly activity footprint.
///
/// The fixed-size array guarantees all 24 hours are always present, including
/// hours (or whole days) with no activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityVector {
    pub date: NaiveDate,
    pub counts: [u32; HOURS_PER_DAY],
}

impl DailyActivityVector {
    /// An all-zero vector for `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            counts: [0; HOURS_PER_DAY],
        }
    }

    pub fn from_counts(date: NaiveDate, counts: [u32; HOURS_PER_DAY]) -> Self {
        Self { date, counts }
    }

    /// Count one event in `hour`. Hours outside 0-23 are ignored.
    pub fn record(&mut self, hour: usize) {
        if let Some(slot) = self.counts.get_mut(hour) {
            *slot = slot.saturating_add(1);
        }
    }

    /// Total number of events across the day.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// `true` when no hour saw any activity.
    pub fn is_inactive(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// An inclusive range of hour indices inferred as sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepBlock {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl SleepBlock {
    /// Number of hours covered, counting both ends.
    pub fn duration_hours(&self) -> u8 {
        self.end_hour - self.start_hour + 1
    }

    pub fn contains(&self, hour: u8) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}

/// Per-day inference result. `block` is `None` when no inactive run met the
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepInterval {
    pub date: NaiveDate,
    pub block: Option<SleepBlock>,
}

impl SleepInterval {
    pub fn none(date: NaiveDate) -> Self {
        Self { date, block: None }
    }

    pub fn start_hour(&self) -> Option<u8> {
        self.block.map(|b| b.start_hour)
    }

    pub fn end_hour(&self) -> Option<u8> {
        self.block.map(|b| b.end_hour)
    }

    pub fn duration_hours(&self) -> Option<u8> {
        self.block.map(|b| b.duration_hours())
    }

    pub fn has_sleep(&self) -> bool {
        self.block.is_some()
    }
}

/// Totals across a collection of [`SleepInterval`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepSummary {
    /// Number of dates that went through inference.
    pub days_analyzed: usize,
    /// Number of those dates with a qualifying block.
    pub days_with_sleep: usize,
    /// Mean block duration over `days_with_sleep`.
    pub average_duration_hours: Option<f64>,
    /// The longest block seen; the earliest date wins ties.
    pub longest: Option<SleepInterval>,
}

impl SleepSummary {
    pub fn from_intervals(intervals: &[SleepInterval]) -> Self {
        let mut summary = SleepSummary {
            days_analyzed: intervals.len(),
            ..Default::default()
        };

        let mut total_hours: u64 = 0;
        for interval in intervals {
            let Some(duration) = interval.duration_hours() else {
                continue;
            };
            summary.days_with_sleep += 1;
            total_hours += u64::from(duration);

            let longer = summary
                .longest
                .and_then(|l| l.duration_hours())
                .map_or(true, |best| duration > best);
            if longer {
                summary.longest = Some(*interval);
            }
        }

        if summary.days_with_sleep > 0 {
            summary.average_duration_hours =
                Some(total_hours as f64 / summary.days_with_sleep as f64);
        }

        summary
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
