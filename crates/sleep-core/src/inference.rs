//! Sleep interval inference over one day's hourly activity vector.
//!
//! A day's inferred sleep is its longest run of zero-activity hours that is at
//! least `min_inactive_hours` long. The day is a closed 0-23 sequence: runs do
//! not wrap across midnight into the neighbouring day. When several runs share
//! the maximal length the earliest one is kept, because a later run only
//! replaces the best block when it is strictly longer.

use tracing::trace;

use crate::models::{DailyActivityVector, SleepBlock, SleepInterval, HOURS_PER_DAY};

/// Default minimum run length, in whole hours.
pub const DEFAULT_MIN_INACTIVE_HOURS: u8 = 5;

/// Stateless inferrer parameterised by the minimum run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepInferrer {
    min_inactive_hours: u8,
}

impl Default for SleepInferrer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INACTIVE_HOURS)
    }
}

/// Open-run bookkeeping for a single scan.
#[derive(Debug, Default)]
struct RunScan {
    current_start: Option<u8>,
    current_length: u8,
    longest: Option<SleepBlock>,
    longest_length: u8,
}

impl RunScan {
    /// Close the open run, ending at `end_hour`, and keep it if it qualifies.
    fn close(&mut self, end_hour: u8, min_inactive_hours: u8) {
        if let Some(start) = self.current_start.take() {
            let length = self.current_length;
            if length >= min_inactive_hours && length > self.longest_length {
                self.longest = Some(SleepBlock {
                    start_hour: start,
                    end_hour,
                });
                self.longest_length = length;
            }
        }
        self.current_length = 0;
    }
}

impl SleepInferrer {
    pub fn new(min_inactive_hours: u8) -> Self {
        Self { min_inactive_hours }
    }

    pub fn min_inactive_hours(&self) -> u8 {
        self.min_inactive_hours
    }

    /// Infer the sleep interval for one day.
    ///
    /// Never fails: an all-active day, or one whose inactive runs are all
    /// shorter than the threshold, yields [`SleepInterval::none`].
    pub fn infer(&self, day: &DailyActivityVector) -> SleepInterval {
        let mut scan = RunScan::default();

        for (hour, &count) in day.counts.iter().enumerate() {
            let hour = hour as u8;
            if count == 0 {
                if scan.current_start.is_none() {
                    scan.current_start = Some(hour);
                    scan.current_length = 1;
                } else {
                    scan.current_length += 1;
                }
            } else if scan.current_start.is_some() {
                scan.close(hour - 1, self.min_inactive_hours);
            }
        }

        // A run still open here reaches the last hour of the day.
        scan.close((HOURS_PER_DAY - 1) as u8, self.min_inactive_hours);

        trace!(
            "infer {}: longest block {:?} ({}h)",
            day.date,
            scan.longest,
            scan.longest_length
        );

        SleepInterval {
            date: day.date,
            block: scan.longest,
        }
    }

    /// Infer every day independently, preserving input order.
    pub fn infer_all(&self, days: &[DailyActivityVector]) -> Vec<SleepInterval> {
        days.iter().map(|day| self.infer(day)).collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
