use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SleepError};

/// Reference zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "US/Eastern";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Source time units ─────────────────────────────────────────────────────────

/// Unit a source log stores its timestamps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
}

impl TimeUnit {
    fn micros_per_unit(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1_000_000,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Microseconds => 1,
        }
    }
}

/// Instant a source log counts its timestamps from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpochBase {
    /// 1970-01-01T00:00:00Z.
    #[default]
    Unix,
    /// 1601-01-01T00:00:00Z, used by Chrome's internal history database.
    Windows,
    /// 2001-01-01T00:00:00Z, used by Safari / Core Data.
    Cocoa,
}

impl EpochBase {
    /// Seconds from the Unix epoch to this base.
    fn unix_offset_seconds(self) -> i64 {
        match self {
            EpochBase::Unix => 0,
            EpochBase::Windows => -11_644_473_600,
            EpochBase::Cocoa => 978_307_200,
        }
    }
}

// ── Range bounds ──────────────────────────────────────────────────────────────

/// A configured date-range bound, either a whole day or an exact local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RangeBound {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl RangeBound {
    /// Local time when used as an inclusive start: midnight for a whole day.
    pub fn as_start(&self) -> NaiveDateTime {
        match *self {
            RangeBound::Date(d) => d.and_time(NaiveTime::MIN),
            RangeBound::DateTime(dt) => dt,
        }
    }

    /// Local time when used as an inclusive end: the last instant of a whole day.
    pub fn as_end(&self) -> NaiveDateTime {
        match *self {
            RangeBound::Date(d) => d.and_time(end_of_day()),
            RangeBound::DateTime(dt) => dt,
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

impl FromStr for RangeBound {
    type Err = SleepError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        const FMTS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
        for fmt in FMTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(RangeBound::DateTime(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(RangeBound::Date)
            .map_err(|_| {
                SleepError::InvalidDateRange(format!(
                    "\"{}\" is not YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
                    s
                ))
            })
    }
}

impl TryFrom<String> for RangeBound {
    type Error = SleepError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RangeBound> for String {
    fn from(bound: RangeBound) -> Self {
        bound.to_string()
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RangeBound::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Converts source timestamps and configured bounds into the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for `tz_name`. `"auto"` resolves to the system zone;
    /// an unrecognised name is an error.
    pub fn new(tz_name: &str) -> Result<Self> {
        let resolved = if tz_name.eq_ignore_ascii_case("auto") {
            get_system_timezone()
        } else {
            tz_name.to_string()
        };
        resolved
            .parse::<Tz>()
            .map(|tz| Self { tz })
            .map_err(|_| SleepError::InvalidTimezone(resolved))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// IANA name of the reference zone.
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Convert a raw source timestamp into the reference zone.
    ///
    /// Accepts JSON integers, floats and numeric strings. Returns `None` for
    /// null, non-numeric or out-of-range values.
    pub fn convert_epoch(&self, value: &Value, unit: TimeUnit, base: EpochBase) -> Option<DateTime<Tz>> {
        let micros = raw_to_micros(value, unit)?;
        let offset = base.unix_offset_seconds().checked_mul(1_000_000)?;
        let unix_micros = micros.checked_add(offset)?;
        let utc = DateTime::from_timestamp_micros(unix_micros)?;
        Some(utc.with_timezone(&self.tz))
    }

    /// Interpret a naive local time in the reference zone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earliest instant; times
    /// that do not exist (DST spring-forward) are an error.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
        self.tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
            SleepError::InvalidDateRange(format!("{} does not exist in {}", naive, self.tz.name()))
        })
    }
}

/// Scale a JSON timestamp value to whole microseconds.
fn raw_to_micros(value: &Value, unit: TimeUnit) -> Option<i64> {
    let factor = unit.micros_per_unit();
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_mul(factor)
            } else {
                n.as_f64().and_then(|f| float_to_micros(f, factor))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                i.checked_mul(factor)
            } else if let Ok(f) = s.parse::<f64>() {
                float_to_micros(f, factor)
            } else {
                debug!("non-numeric timestamp string \"{}\"", s);
                None
            }
        }
        _ => None,
    }
}

fn float_to_micros(value: f64, factor: i64) -> Option<i64> {
    let scaled = (value * factor as f64).round();
    if scaled.is_finite() && scaled.abs() < i64::MAX as f64 {
        Some(scaled as i64)
    } else {
        None
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn eastern() -> TimezoneHandler {
        TimezoneHandler::new("US/Eastern").unwrap()
    }

    // ── TimezoneHandler::new ─────────────────────────────────────────────────

    #[test]
    fn test_new_accepts_iana_names() {
        assert_eq!(TimezoneHandler::new("Europe/Berlin").unwrap().name(), "Europe/Berlin");
        assert_eq!(eastern().name(), "US/Eastern");
    }

    #[test]
    fn test_new_rejects_unknown_zone() {
        let err = TimezoneHandler::new("Invalid/Zone").unwrap_err();
        assert!(matches!(err, SleepError::InvalidTimezone(ref z) if z == "Invalid/Zone"));
    }

    #[test]
    fn test_new_auto_resolves_to_a_valid_zone() {
        // Whatever the host reports must itself be parseable.
        if let Ok(handler) = TimezoneHandler::new("auto") {
            assert!(handler.name().parse::<Tz>().is_ok());
        }
    }

    // ── convert_epoch ─────────────────────────────────────────────────────────

    #[test]
    fn test_convert_epoch_milliseconds() {
        // 2025-01-15T08:00:00Z = 03:00 EST.
        let dt = eastern()
            .convert_epoch(&json!(1_736_928_000_000i64), TimeUnit::Milliseconds, EpochBase::Unix)
            .unwrap();
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn test_convert_epoch_microseconds() {
        let dt = eastern()
            .convert_epoch(
                &json!(1_736_928_000_000_000i64),
                TimeUnit::Microseconds,
                EpochBase::Unix,
            )
            .unwrap();
        assert_eq!(dt.hour(), 3);
    }

    #[test]
    fn test_convert_epoch_seconds_float_and_string() {
        let handler = eastern();
        let from_float = handler
            .convert_epoch(&json!(1_736_928_000.5), TimeUnit::Seconds, EpochBase::Unix)
            .unwrap();
        assert_eq!(from_float.nanosecond(), 500_000_000);

        let from_string = handler
            .convert_epoch(&json!("1736928000000"), TimeUnit::Milliseconds, EpochBase::Unix)
            .unwrap();
        assert_eq!(from_string.hour(), 3);
    }

    #[test]
    fn test_convert_epoch_windows_base() {
        // 13_381_372_800 s after 1601-01-01 is 2025-01-15T00:00:00Z.
        let raw = (1_736_899_200i64 + 11_644_473_600) * 1_000_000;
        let dt = TimezoneHandler::new("UTC")
            .unwrap()
            .convert_epoch(&json!(raw), TimeUnit::Microseconds, EpochBase::Windows)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2025, 1, 15, 0));
    }

    #[test]
    fn test_convert_epoch_cocoa_base() {
        let dt = TimezoneHandler::new("UTC")
            .unwrap()
            .convert_epoch(&json!(0), TimeUnit::Seconds, EpochBase::Cocoa)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2001, 1, 1));
    }

    #[test]
    fn test_convert_epoch_rejects_non_numeric() {
        let handler = eastern();
        assert!(handler
            .convert_epoch(&Value::Null, TimeUnit::Seconds, EpochBase::Unix)
            .is_none());
        assert!(handler
            .convert_epoch(&json!("yesterday"), TimeUnit::Seconds, EpochBase::Unix)
            .is_none());
        assert!(handler
            .convert_epoch(&json!({"t": 1}), TimeUnit::Seconds, EpochBase::Unix)
            .is_none());
    }

    #[test]
    fn test_convert_epoch_rejects_overflow() {
        assert!(eastern()
            .convert_epoch(&json!(i64::MAX), TimeUnit::Seconds, EpochBase::Unix)
            .is_none());
    }

    // ── localize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_localize_regular_time() {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dt = eastern().localize(naive).unwrap();
        assert_eq!(dt.naive_local(), naive);
        assert_eq!(dt.naive_utc().hour(), 5);
    }

    #[test]
    fn test_localize_dst_gap_is_error() {
        // 2025-03-09 02:30 does not exist in US/Eastern.
        let naive = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(matches!(
            eastern().localize(naive),
            Err(SleepError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn test_localize_ambiguous_uses_earliest() {
        // 2025-11-02 01:30 happens twice in US/Eastern; EDT (UTC-4) comes first.
        let naive = NaiveDate::from_ymd_opt(2025, 11, 2)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let dt = eastern().localize(naive).unwrap();
        assert_eq!(dt.naive_utc().hour(), 5);
    }

    // ── RangeBound ───────────────────────────────────────────────────────────

    #[test]
    fn test_range_bound_parses_date() {
        let bound: RangeBound = "2025-01-31".parse().unwrap();
        assert_eq!(
            bound.as_start(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        let end = bound.as_end();
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.nanosecond(), 999_999_999);
    }

    #[test]
    fn test_range_bound_parses_datetime() {
        let bound: RangeBound = "2025-01-31T06:30:00".parse().unwrap();
        assert_eq!(bound.as_start(), bound.as_end());
        let spaced: RangeBound = "2025-01-31 06:30:00".parse().unwrap();
        assert_eq!(bound, spaced);
    }

    #[test]
    fn test_range_bound_rejects_garbage() {
        assert!("January 2025".parse::<RangeBound>().is_err());
    }

    #[test]
    fn test_range_bound_serde_as_string() {
        let bound: RangeBound = serde_json::from_str("\"2025-01-01\"").unwrap();
        assert_eq!(bound, RangeBound::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert_eq!(serde_json::to_string(&bound).unwrap(), "\"2025-01-01\"");
        assert!(serde_json::from_str::<RangeBound>("\"not a date\"").is_err());
    }
}
