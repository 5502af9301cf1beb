//! Inclusive time-window filtering of normalized events.

use chrono::DateTime;
use chrono_tz::Tz;
use sleep_core::error::{Result, SleepError};
use sleep_core::models::Event;
use sleep_core::settings::AnalysisConfig;
use sleep_core::time_utils::{RangeBound, TimezoneHandler};

/// Inclusive `[start, end]` window in the reference zone; `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
}

impl TimeWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Localize configured bounds. A date-only start is that day's midnight,
    /// a date-only end is the last instant of that day.
    pub fn from_bounds(
        start: Option<RangeBound>,
        end: Option<RangeBound>,
        tz: &TimezoneHandler,
    ) -> Result<Self> {
        let start = start.map(|b| tz.localize(b.as_start())).transpose()?;
        let end = end.map(|b| tz.localize(b.as_end())).transpose()?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(SleepError::InvalidDateRange(format!(
                    "start {} is after end {}",
                    s.to_rfc3339(),
                    e.to_rfc3339()
                )));
            }
        }

        Ok(Self { start, end })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::from_bounds(
            config.date_range_start,
            config.date_range_end,
            &config.timezone,
        )
    }

    pub fn contains(&self, ts: &DateTime<Tz>) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Keep the events inside `window`. Timestamps are not touched.
pub fn filter_events(events: Vec<Event>, window: &TimeWindow) -> Vec<Event> {
    if window.is_unbounded() {
        return events;
    }
    events
        .into_iter()
        .filter(|e| window.contains(&e.timestamp))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn eastern() -> TimezoneHandler {
        TimezoneHandler::new("US/Eastern").unwrap()
    }

    fn event_at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Event {
        let tz = eastern().tz();
        let ts = tz.with_ymd_and_hms(y, m, d, h, min, s).unwrap();
        Event::new(ts, "test")
    }

    fn bound(s: &str) -> Option<RangeBound> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let events = vec![event_at(2020, 1, 1, 0, 0, 0), event_at(2030, 1, 1, 0, 0, 0)];
        assert_eq!(filter_events(events, &TimeWindow::unbounded()).len(), 2);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let window = TimeWindow::from_bounds(
            bound("2025-01-10T08:00:00"),
            bound("2025-01-10T20:00:00"),
            &eastern(),
        )
        .unwrap();

        assert!(window.contains(&event_at(2025, 1, 10, 8, 0, 0).timestamp));
        assert!(window.contains(&event_at(2025, 1, 10, 20, 0, 0).timestamp));
        assert!(!window.contains(&event_at(2025, 1, 10, 7, 59, 59).timestamp));
        assert!(!window.contains(&event_at(2025, 1, 10, 20, 0, 1).timestamp));
    }

    #[test]
    fn test_date_only_end_covers_whole_day() {
        let window =
            TimeWindow::from_bounds(bound("2025-01-01"), bound("2025-01-31"), &eastern()).unwrap();
        let events = vec![
            event_at(2024, 12, 31, 23, 59, 59),
            event_at(2025, 1, 1, 0, 0, 0),
            event_at(2025, 1, 31, 23, 59, 59),
            event_at(2025, 2, 1, 0, 0, 0),
        ];
        let kept = filter_events(events, &window);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(kept[1].date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn test_open_ended_bounds() {
        let from_only = TimeWindow::from_bounds(bound("2025-01-01"), None, &eastern()).unwrap();
        assert!(from_only.contains(&event_at(2099, 1, 1, 0, 0, 0).timestamp));
        assert!(!from_only.contains(&event_at(2024, 12, 31, 12, 0, 0).timestamp));

        let until_only = TimeWindow::from_bounds(None, bound("2025-01-01"), &eastern()).unwrap();
        assert!(until_only.contains(&event_at(2000, 1, 1, 0, 0, 0).timestamp));
        assert!(until_only.contains(&event_at(2025, 1, 1, 23, 0, 0).timestamp));
    }

    #[test]
    fn test_inverted_bounds_are_error() {
        assert!(matches!(
            TimeWindow::from_bounds(bound("2025-02-01"), bound("2025-01-01"), &eastern()),
            Err(SleepError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn test_bound_in_dst_gap_is_error() {
        // 02:30 on 2025-03-09 does not exist in US/Eastern.
        assert!(TimeWindow::from_bounds(bound("2025-03-09T02:30:00"), None, &eastern()).is_err());
    }

    #[test]
    fn test_single_day_window() {
        let window =
            TimeWindow::from_bounds(bound("2025-01-05"), bound("2025-01-05"), &eastern()).unwrap();
        assert!(window.contains(&event_at(2025, 1, 5, 0, 0, 0).timestamp));
        assert!(window.contains(&event_at(2025, 1, 5, 23, 59, 59).timestamp));
        assert!(!window.contains(&event_at(2025, 1, 6, 0, 0, 0).timestamp));
    }
}
