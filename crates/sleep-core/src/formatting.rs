use crate::models::SleepInterval;

/// Format an hour-of-day boundary (0-24) as `"HH:00"`.
///
/// # Examples
///
/// ```
/// use sleep_core::formatting::format_hour;
///
/// assert_eq!(format_hour(0),  "00:00");
/// assert_eq!(format_hour(7),  "07:00");
/// assert_eq!(format_hour(24), "24:00");
/// ```
pub fn format_hour(hour: u8) -> String {
    format!("{:02}:00", hour)
}

/// Format a duration in hours, dropping the decimals when the value is whole.
///
/// # Examples
///
/// ```
/// use sleep_core::formatting::format_hours;
///
/// assert_eq!(format_hours(7.0, 1),  "7h");
/// assert_eq!(format_hours(6.25, 1), "6.3h");
/// assert_eq!(format_hours(0.0, 2),  "0h");
/// ```
pub fn format_hours(hours: f64, decimals: u32) -> String {
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (hours * factor).round() / factor;
    if rounded.fract() == 0.0 {
        format!("{}h", rounded as i64)
    } else {
        format!("{:.prec$}h", rounded, prec = decimals as usize)
    }
}

/// Describe the wall-clock span of an interval's block, or `"—"` when none.
///
/// The end is exclusive: a block covering hours 1 through 7 spans
/// `"01:00–08:00"`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sleep_core::formatting::format_span;
/// use sleep_core::models::{SleepBlock, SleepInterval};
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let block = SleepBlock { start_hour: 1, end_hour: 7 };
/// assert_eq!(format_span(&SleepInterval { date, block: Some(block) }), "01:00–08:00");
/// assert_eq!(format_span(&SleepInterval::none(date)), "—");
/// ```
pub fn format_span(interval: &SleepInterval) -> String {
    match interval.block {
        Some(block) => format!(
            "{}–{}",
            format_hour(block.start_hour),
            format_hour(block.end_hour + 1)
        ),
        None => "—".to_string(),
    }
}

/// Render an optional hour value for tabular output; `None` becomes empty.
pub fn optional_cell(value: Option<u8>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_cell() {
        assert_eq!(optional_cell(Some(5)), "5");
        assert_eq!(optional_cell(None), "");
    }

    #[test]
    fn test_format_hours_rounding() {
        assert_eq!(format_hours(6.96, 1), "7h");
        assert_eq!(format_hours(5.5, 0), "6h");
    }
}
