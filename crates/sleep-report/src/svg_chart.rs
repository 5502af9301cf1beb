//! Static SVG Gantt chart of inferred sleep blocks.
//!
//! One row per date with a block, date ascending; bars start at
//! `start_hour` and span `duration_hours` on a fixed 0-24 axis.

use std::fmt::Write as _;
use std::path::Path;

use sleep_core::error::{Result, SleepError};
use sleep_core::formatting::{format_hours, format_span};
use sleep_core::models::SleepInterval;
use tracing::debug;

const CANVAS_WIDTH: f64 = 960.0;
const MARGIN_LEFT: f64 = 110.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 64.0;
const ROW_HEIGHT: f64 = 24.0;
const BAR_HEIGHT: f64 = 12.0;
const MIN_ROWS: usize = 3;

const FONT: &str = "Inter, Segoe UI, sans-serif";
const BAR_FILL: &str = "#d64545";

/// Render the chart as an SVG document.
pub fn render_svg(intervals: &[SleepInterval], title: &str, tz_name: &str) -> String {
    let mut rows: Vec<&SleepInterval> = intervals.iter().filter(|i| i.has_sleep()).collect();
    rows.sort_by_key(|i| i.date);

    let plot_width = CANVAS_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = rows.len().max(MIN_ROWS) as f64 * ROW_HEIGHT;
    let height = MARGIN_TOP + plot_height + MARGIN_BOTTOM;
    let hour_width = plot_width / 24.0;
    let plot_bottom = MARGIN_TOP + plot_height;

    let mut svg = String::new();

    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{CANVAS_WIDTH:.0}' height='{height:.0}' viewBox='0 0 {CANVAS_WIDTH:.0} {height:.0}' role='img'>"
    );
    let _ = writeln!(
        svg,
        "  <rect width='{CANVAS_WIDTH:.0}' height='{height:.0}' fill='#ffffff'/>"
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.1}' y='40' text-anchor='middle' fill='#1f2430' font-family='{FONT}' font-size='20' font-weight='600'>{}</text>",
        MARGIN_LEFT + plot_width / 2.0,
        escape_text(title)
    );

    // Vertical grid with hour labels every two hours.
    for hour in (0..=24).step_by(2) {
        let x = MARGIN_LEFT + hour as f64 * hour_width;
        let _ = writeln!(
            svg,
            "  <line x1='{x:.1}' y1='{MARGIN_TOP:.1}' x2='{x:.1}' y2='{plot_bottom:.1}' stroke='#e3e6ee' stroke-width='1'/>"
        );
        let _ = writeln!(
            svg,
            "  <text x='{x:.1}' y='{:.1}' text-anchor='middle' fill='#4a5060' font-family='{FONT}' font-size='12'>{hour}</text>",
            plot_bottom + 18.0
        );
    }
    let _ = writeln!(
        svg,
        "  <rect x='{MARGIN_LEFT:.1}' y='{MARGIN_TOP:.1}' width='{plot_width:.1}' height='{plot_height:.1}' fill='none' stroke='#9aa0ad' stroke-width='1'/>"
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.1}' y='{:.1}' text-anchor='middle' fill='#1f2430' font-family='{FONT}' font-size='14'>Hour of Day ({})</text>",
        MARGIN_LEFT + plot_width / 2.0,
        plot_bottom + 46.0,
        escape_text(tz_name)
    );

    if rows.is_empty() {
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' text-anchor='middle' fill='#7a8090' font-family='{FONT}' font-size='16'>No inferred sleep</text>",
            MARGIN_LEFT + plot_width / 2.0,
            MARGIN_TOP + plot_height / 2.0
        );
    }

    for (index, interval) in rows.iter().enumerate() {
        let Some(block) = interval.block else {
            continue;
        };
        let center_y = MARGIN_TOP + (index as f64 + 0.5) * ROW_HEIGHT;
        let x = MARGIN_LEFT + f64::from(block.start_hour) * hour_width;
        let width = f64::from(block.duration_hours()) * hour_width;
        let date = interval.date.format("%Y-%m-%d");

        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' text-anchor='end' fill='#4a5060' font-family='{FONT}' font-size='12'>{date}</text>",
            MARGIN_LEFT - 10.0,
            center_y + 4.0
        );
        let _ = writeln!(
            svg,
            "  <rect class='sleep-bar' x='{x:.1}' y='{:.1}' width='{width:.1}' height='{BAR_HEIGHT:.1}' rx='2' fill='{BAR_FILL}' fill-opacity='0.7'><title>{date}: {} ({})</title></rect>",
            center_y - BAR_HEIGHT / 2.0,
            escape_text(&format_span(interval)),
            format_hours(f64::from(block.duration_hours()), 0)
        );
    }

    let _ = writeln!(svg, "</svg>");
    svg
}

/// Render and write the chart to `path`.
pub fn write_svg(intervals: &[SleepInterval], path: &Path, title: &str, tz_name: &str) -> Result<()> {
    let svg = render_svg(intervals, title, tz_name);
    std::fs::write(path, svg).map_err(|source| SleepError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote sleep chart to {}", path.display());
    Ok(())
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
