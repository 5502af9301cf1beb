//! Per-date table view for the chart viewer.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per analysed
//! date plus a highlighted summary row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use sleep_core::formatting::{format_hour, format_hours, format_span};
use sleep_core::models::{SleepInterval, SleepSummary};

use crate::themes::Theme;

fn hour_cell(hour: Option<u8>) -> Cell<'static> {
    Cell::from(hour.map(format_hour).unwrap_or_else(|| "—".to_string()))
}

/// Text of the summary row's last three cells.
fn summary_cells(summary: &SleepSummary) -> [String; 3] {
    let average = summary
        .average_duration_hours
        .map(|h| format!("avg {}", format_hours(h, 1)))
        .unwrap_or_else(|| "avg —".to_string());
    let longest = summary
        .longest
        .map(|l| format!("max {} on {}", format_span(&l), l.date.format("%Y-%m-%d")))
        .unwrap_or_default();
    [
        format!("{}/{} days", summary.days_with_sleep, summary.days_analyzed),
        average,
        longest,
    ]
}

/// Render the per-date table into `area`, starting at row `scroll`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    intervals: &[SleepInterval],
    summary: &SleepSummary,
    scroll: usize,
    theme: &Theme,
) {
    let header_cells = ["Date", "Start", "Until", "Duration", "Span"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = intervals
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(i, interval)| {
            let duration = interval
                .duration_hours()
                .map(|d| format_hours(f64::from(d), 0))
                .unwrap_or_else(|| "—".to_string());
            Row::new(vec![
                Cell::from(interval.date.format("%Y-%m-%d").to_string()),
                hour_cell(interval.start_hour()),
                // Display the exclusive end boundary.
                hour_cell(interval.end_hour().map(|h| h + 1)),
                Cell::from(duration),
                Cell::from(format_span(interval)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let [days, average, longest] = summary_cells(summary);
    let total_row = Row::new(vec![
        Cell::from("SUMMARY"),
        Cell::from(""),
        Cell::from(days),
        Cell::from(average),
        Cell::from(longest),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(14),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Span::styled(" Sleep per Date ", theme.header)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when no dates were analysed.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No activity in the analysed range", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the source paths and --start/--end.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" browse-sleep "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
