mod bootstrap;

use anyhow::{Context, Result};
use sleep_core::formatting::{format_hours, format_span};
use sleep_core::models::SleepSummary;
use sleep_core::settings::{ConfigFile, Settings};
use sleep_data::analysis::{analyze, AnalysisMetadata};
use sleep_report::app::ChartApp;
use sleep_report::export::write_report;
use sleep_report::svg_chart::write_svg;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("browse-sleep v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = settings
        .config
        .clone()
        .or_else(bootstrap::discover_config_file);
    let config_file = match &config_path {
        Some(path) => {
            tracing::info!("Using config file {}", path.display());
            Some(ConfigFile::load_from(path)?)
        }
        None => None,
    };

    let (config, output) = settings.resolve(config_file)?;
    tracing::info!(
        "Sources: {}, threshold: {}h, timezone: {}",
        config
            .sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        config.min_inactive_hours,
        config.timezone.name()
    );

    let result = analyze(&config)?;
    tracing::info!("{}", describe_metadata(&result.metadata));

    bootstrap::ensure_parent_dirs(
        std::iter::once(output.report_path.as_path()).chain(output.chart_path.as_deref()),
    )
    .context("cannot create output directories")?;

    write_report(&result.intervals, &output.report_path, output.report_format)?;
    tracing::info!(
        "Exported {} dates to {}",
        result.intervals.len(),
        output.report_path.display()
    );

    if let Some(chart_path) = &output.chart_path {
        write_svg(
            &result.intervals,
            chart_path,
            &output.chart_title,
            config.timezone.name(),
        )?;
        tracing::info!("Chart written to {}", chart_path.display());
    }

    tracing::info!("{}", describe_summary(&result.summary));

    if output.show {
        ChartApp::new(
            &output.theme,
            output.chart_title.clone(),
            config.timezone.name(),
            &result.intervals,
            &result.summary,
        )
        .run()
        .context("terminal viewer failed")?;
    }

    Ok(())
}

fn describe_metadata(metadata: &AnalysisMetadata) -> String {
    format!(
        "{} of {} events from {} sources in range (loaded in {:.2}s)",
        metadata.events_in_range,
        metadata.events_loaded,
        metadata.sources_loaded,
        metadata.load_time_seconds
    )
}

fn describe_summary(summary: &SleepSummary) -> String {
    let mut text = format!(
        "Sleep inferred on {} of {} days",
        summary.days_with_sleep, summary.days_analyzed
    );
    if let Some(average) = summary.average_duration_hours {
        text.push_str(&format!(", average {}", format_hours(average, 1)));
    }
    if let Some(longest) = &summary.longest {
        text.push_str(&format!(
            ", longest {} on {}",
            format_span(longest),
            longest.date.format("%Y-%m-%d")
        ));
    }
    text
}
