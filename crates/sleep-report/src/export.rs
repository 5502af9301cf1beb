//! Per-date report writers (CSV and JSON).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use sleep_core::error::{Result, SleepError};
use sleep_core::formatting::optional_cell;
use sleep_core::models::SleepInterval;
use sleep_core::settings::ReportFormat;
use tracing::debug;

/// Column order shared by both formats.
pub const REPORT_COLUMNS: [&str; 4] = [
    "date",
    "sleep_start_hour",
    "sleep_end_hour",
    "sleep_duration_hours",
];

/// One report row; `None` fields mean no sleep was inferred for the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub sleep_start_hour: Option<u8>,
    pub sleep_end_hour: Option<u8>,
    pub sleep_duration_hours: Option<u8>,
}

impl From<&SleepInterval> for ReportRow {
    fn from(interval: &SleepInterval) -> Self {
        Self {
            date: interval.date,
            sleep_start_hour: interval.start_hour(),
            sleep_end_hour: interval.end_hour(),
            sleep_duration_hours: interval.duration_hours(),
        }
    }
}

/// Write `intervals` to `path` in input order.
pub fn write_report(intervals: &[SleepInterval], path: &Path, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Csv => write_csv(intervals, path),
        ReportFormat::Json => write_json(intervals, path),
    }?;
    debug!("Wrote {} report rows to {}", intervals.len(), path.display());
    Ok(())
}

/// CSV with a header row; "none" rows have empty hour fields.
pub fn write_csv(intervals: &[SleepInterval], path: &Path) -> Result<()> {
    let file = create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    let to_err = |e: csv::Error| SleepError::FileWrite {
        path: path.to_path_buf(),
        source: e.into(),
    };

    writer.write_record(REPORT_COLUMNS).map_err(to_err)?;
    for interval in intervals {
        writer
            .write_record([
                interval.date.format("%Y-%m-%d").to_string(),
                optional_cell(interval.start_hour()),
                optional_cell(interval.end_hour()),
                optional_cell(interval.duration_hours()),
            ])
            .map_err(to_err)?;
    }
    writer.flush().map_err(|source| SleepError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty JSON array of [`ReportRow`]s; "none" fields are `null`.
pub fn write_json(intervals: &[SleepInterval], path: &Path) -> Result<()> {
    let rows: Vec<ReportRow> = intervals.iter().map(ReportRow::from).collect();
    let mut writer = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut writer, &rows).map_err(|e| SleepError::FileWrite {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|source| SleepError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| SleepError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sleep_core::models::SleepBlock;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn intervals() -> Vec<SleepInterval> {
        vec![
            SleepInterval {
                date: date(1),
                block: Some(SleepBlock {
                    start_hour: 1,
                    end_hour: 7,
                }),
            },
            SleepInterval::none(date(2)),
            SleepInterval {
                date: date(3),
                block: Some(SleepBlock {
                    start_hour: 0,
                    end_hour: 23,
                }),
            },
        ]
    }

    #[test]
    fn test_csv_layout_with_empty_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.csv");
        write_report(&intervals(), &path, ReportFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,sleep_start_hour,sleep_end_hour,sleep_duration_hours",
                "2025-01-01,1,7,7",
                "2025-01-02,,,",
                "2025-01-03,0,23,24",
            ]
        );
    }

    #[test]
    fn test_csv_header_written_for_empty_input() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.csv");
        write_csv(&[], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "date,sleep_start_hour,sleep_end_hour,sleep_duration_hours"
        );
    }

    #[test]
    fn test_json_nulls_for_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.json");
        write_report(&intervals(), &path, ReportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["date"], "2025-01-01");
        assert_eq!(rows[0]["sleep_start_hour"], 1);
        assert_eq!(rows[0]["sleep_duration_hours"], 7);
        assert!(rows[1]["sleep_start_hour"].is_null());
        assert!(rows[1]["sleep_end_hour"].is_null());
        assert!(rows[1]["sleep_duration_hours"].is_null());
    }

    #[test]
    fn test_unwritable_path_is_file_write_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("report.csv");
        assert!(matches!(
            write_report(&intervals(), &path, ReportFormat::Csv),
            Err(SleepError::FileWrite { .. })
        ));
    }
}
