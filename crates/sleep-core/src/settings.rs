use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SleepError};
use crate::inference::DEFAULT_MIN_INACTIVE_HOURS;
use crate::source_config::{LogFormat, SourceConfig};
use crate::time_utils::{RangeBound, TimezoneHandler, DEFAULT_TIMEZONE};

/// Default report location, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "sleep_ranges_per_date.csv";
/// Default chart location, relative to the working directory.
pub const DEFAULT_CHART_PATH: &str = "sleep_intervals.svg";
/// Default chart title.
pub const DEFAULT_CHART_TITLE: &str = "Inferred Sleep Intervals";

// ── Enumerated options ─────────────────────────────────────────────────────────

/// How dates without a single event are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDayPolicy {
    /// Dates without events do not appear in the output.
    #[default]
    Omit,
    /// Dates without events get an all-zero vector (a full day of inactivity).
    Inactive,
}

/// Serialization of the per-date report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Infer daily sleep windows from browser history
#[derive(Parser, Debug, Clone)]
#[command(
    name = "browse-sleep",
    about = "Infer daily sleep windows from browser history",
    version
)]
pub struct Settings {
    /// Chrome history JSON file
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Layout of the Chrome file
    #[arg(long, value_enum, default_value = "chrome_sessions")]
    pub chrome_format: LogFormat,

    /// Safari history JSON file
    #[arg(long)]
    pub safari: Option<PathBuf>,

    /// JSON config file (sources, thresholds, range, outputs)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum inactive run, in hours, that counts as sleep (1-24)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=24))]
    pub min_inactive_hours: u8,

    /// Inclusive start of the analysed range (YYYY-MM-DD[THH:MM:SS])
    #[arg(long)]
    pub start: Option<RangeBound>,

    /// Inclusive end of the analysed range (YYYY-MM-DD[THH:MM:SS])
    #[arg(long)]
    pub end: Option<RangeBound>,

    /// Reference timezone for day and hour boundaries ("auto" = system)
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Treatment of dates without any events
    #[arg(long, value_enum, default_value = "omit")]
    pub empty_days: EmptyDayPolicy,

    /// Report output path
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    pub output: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value = "csv")]
    pub report_format: ReportFormat,

    /// SVG chart output path
    #[arg(long, default_value = DEFAULT_CHART_PATH)]
    pub chart: PathBuf,

    /// Skip writing the SVG chart
    #[arg(long)]
    pub no_chart: bool,

    /// Chart title
    #[arg(long, default_value = DEFAULT_CHART_TITLE)]
    pub title: String,

    /// Open the interactive terminal chart after exporting
    #[arg(long)]
    pub show: bool,

    /// Terminal theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Argument ids given explicitly on the command line.
    #[arg(skip)]
    pub explicit: HashSet<String>,
}

// ── ConfigFile ─────────────────────────────────────────────────────────────────

/// Optional JSON configuration, e.g. `~/.browse-sleep/config.json`.
///
/// Every field is optional; values given explicitly on the command line win.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub sources: Vec<SourceConfig>,
    pub min_inactive_hours: Option<u8>,
    pub date_range_start: Option<RangeBound>,
    pub date_range_end: Option<RangeBound>,
    pub reference_timezone: Option<String>,
    pub empty_days: Option<EmptyDayPolicy>,
    pub output: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
    pub chart: Option<PathBuf>,
    pub chart_title: Option<String>,
}

impl ConfigFile {
    /// Candidate locations checked when `--config` is not given, in order.
    pub fn default_paths() -> Vec<PathBuf> {
        let Some(home) = dirs::home_dir() else {
            return Vec::new();
        };
        Self::default_paths_in(&home)
    }

    /// Candidate locations rooted at `base_dir` (used for testing).
    pub fn default_paths_in(base_dir: &Path) -> Vec<PathBuf> {
        vec![
            base_dir.join(".browse-sleep").join("config.json"),
            base_dir.join(".config").join("browse-sleep").join("config.json"),
        ]
    }

    /// Read and parse a config file. Unlike source logs, a config is small
    /// enough to read in one go.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SleepError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SleepError::JsonParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Resolved configuration ─────────────────────────────────────────────────────

/// Everything the analysis stages need, fixed once at startup.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub sources: Vec<SourceConfig>,
    pub min_inactive_hours: u8,
    pub date_range_start: Option<RangeBound>,
    pub date_range_end: Option<RangeBound>,
    pub timezone: TimezoneHandler,
    pub empty_days: EmptyDayPolicy,
}

impl AnalysisConfig {
    /// A config with default threshold, zone and policy and no range.
    pub fn new(sources: Vec<SourceConfig>) -> Result<Self> {
        Ok(Self {
            sources,
            min_inactive_hours: DEFAULT_MIN_INACTIVE_HOURS,
            date_range_start: None,
            date_range_end: None,
            timezone: TimezoneHandler::new(DEFAULT_TIMEZONE)?,
            empty_days: EmptyDayPolicy::default(),
        })
    }
}

/// Where and how results are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
    /// `None` when chart writing is disabled.
    pub chart_path: Option<PathBuf>,
    pub chart_title: String,
    pub show: bool,
    pub theme: String,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Parse an explicit argument list, recording which arguments were given
    /// on the command line and applying `--debug`.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = match Settings::from_arg_matches(&matches) {
            Ok(s) => s,
            Err(e) => e.exit(),
        };

        settings.explicit = matches
            .ids()
            .map(|id| id.as_str().to_string())
            .filter(|id| is_arg_explicitly_set(&matches, id))
            .collect();

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    fn is_explicit(&self, id: &str) -> bool {
        self.explicit.contains(id)
    }

    /// Merge with `file` (command line wins) and validate into the immutable
    /// analysis and output configuration.
    pub fn resolve(&self, file: Option<ConfigFile>) -> Result<(AnalysisConfig, OutputConfig)> {
        let file = file.unwrap_or_default();

        let mut sources = file.sources;
        if let Some(path) = &self.chrome {
            upsert_source(&mut sources, SourceConfig::new("chrome", path, self.chrome_format));
        }
        if let Some(path) = &self.safari {
            upsert_source(
                &mut sources,
                SourceConfig::new("safari", path, LogFormat::SafariHistory),
            );
        }
        if sources.is_empty() {
            return Err(SleepError::Config(
                "no sources configured; pass --chrome/--safari or a config file".to_string(),
            ));
        }
        if sources.len() == 1 {
            warn!(
                "Only source \"{}\" configured; sleep is inferred from its activity alone",
                sources[0].name
            );
        }

        let min_inactive_hours = self.pick("min_inactive_hours", self.min_inactive_hours, file.min_inactive_hours);
        if !(1..=24).contains(&min_inactive_hours) {
            return Err(SleepError::Config(format!(
                "min_inactive_hours must be between 1 and 24, got {}",
                min_inactive_hours
            )));
        }

        let timezone_name = self.pick("timezone", self.timezone.clone(), file.reference_timezone);
        let timezone = TimezoneHandler::new(&timezone_name)?;

        let date_range_start = self.start.or(file.date_range_start);
        let date_range_end = self.end.or(file.date_range_end);
        if let (Some(start), Some(end)) = (date_range_start, date_range_end) {
            if start.as_start() > end.as_end() {
                return Err(SleepError::InvalidDateRange(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }

        let analysis = AnalysisConfig {
            sources,
            min_inactive_hours,
            date_range_start,
            date_range_end,
            timezone,
            empty_days: self.pick("empty_days", self.empty_days, file.empty_days),
        };

        let chart_path = if self.no_chart {
            None
        } else {
            Some(self.pick("chart", self.chart.clone(), file.chart))
        };
        let output = OutputConfig {
            report_path: self.pick("output", self.output.clone(), file.output),
            report_format: self.pick("report_format", self.report_format, file.report_format),
            chart_path,
            chart_title: self.pick("title", self.title.clone(), file.chart_title),
            show: self.show,
            theme: self.theme.clone(),
        };

        debug!(
            "Resolved {} source(s), threshold {}h, zone {}",
            analysis.sources.len(),
            analysis.min_inactive_hours,
            analysis.timezone.name()
        );

        Ok((analysis, output))
    }

    /// The command-line value when given explicitly, else the file value,
    /// else the command-line default.
    fn pick<T>(&self, id: &str, cli: T, file: Option<T>) -> T {
        if self.is_explicit(id) {
            cli
        } else {
            file.unwrap_or(cli)
        }
    }
}

/// Replace the source with the same name, or append.
fn upsert_source(sources: &mut Vec<SourceConfig>, source: SourceConfig) {
    match sources.iter_mut().find(|s| s.name == source.name) {
        Some(existing) => *existing = source,
        None => sources.push(source),
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
