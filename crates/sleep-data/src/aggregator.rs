//! Hourly activity aggregation per calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sleep_core::models::{DailyActivityVector, Event};
use tracing::debug;

/// Stateless helper that buckets events by reference-zone date and hour.
pub struct HourlyAggregator;

impl HourlyAggregator {
    /// One vector per date with at least one event, sorted by date.
    pub fn aggregate(events: &[Event]) -> Vec<DailyActivityVector> {
        let mut days: BTreeMap<NaiveDate, DailyActivityVector> = BTreeMap::new();

        for event in events {
            let date = event.date();
            days.entry(date)
                .or_insert_with(|| DailyActivityVector::empty(date))
                .record(event.hour());
        }

        debug!("Aggregated {} events into {} days", events.len(), days.len());
        days.into_values().collect()
    }

    /// Add an all-zero vector for every date in `[first, last]` that has none.
    ///
    /// Existing vectors are kept untouched, including any outside the range.
    pub fn fill_calendar(
        vectors: Vec<DailyActivityVector>,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Vec<DailyActivityVector> {
        let mut days: BTreeMap<NaiveDate, DailyActivityVector> =
            vectors.into_iter().map(|v| (v.date, v)).collect();
        let before = days.len();

        for date in first.iter_days().take_while(|d| *d <= last) {
            days.entry(date)
                .or_insert_with(|| DailyActivityVector::empty(date));
        }

        debug!(
            "Filled {} empty days between {} and {}",
            days.len() - before,
            first,
            last
        );
        days.into_values().collect()
    }
}
