//! Terminal Gantt view: one row of 24 hour cells per date with a block.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use sleep_core::formatting::{format_hours, format_span};
use sleep_core::models::{SleepInterval, HOURS_PER_DAY};

use crate::themes::Theme;

const DATE_WIDTH: usize = 12;
const CELL: &str = "██";
const EMPTY_CELL: &str = "··";

/// Hour ruler aligned with the two-character cells.
fn axis_line(theme: &Theme) -> Line<'static> {
    let mut ruler = " ".repeat(DATE_WIDTH);
    for hour in (0..HOURS_PER_DAY).step_by(3) {
        ruler.push_str(&format!("{:<6}", hour));
    }
    ruler.push_str("24");
    Line::from(Span::styled(ruler, theme.axis))
}

fn interval_line(interval: &SleepInterval, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:<width$}", interval.date.format("%Y-%m-%d"), width = DATE_WIDTH),
        theme.label,
    )];
    let block = interval.block;
    for hour in 0..HOURS_PER_DAY as u8 {
        let asleep = block.is_some_and(|b| b.contains(hour));
        spans.push(if asleep {
            Span::styled(CELL, theme.sleep_bar)
        } else {
            Span::styled(EMPTY_CELL, theme.awake)
        });
    }
    if let Some(b) = block {
        spans.push(Span::styled(
            format!(
                "  {} {}",
                format_span(interval),
                format_hours(f64::from(b.duration_hours()), 0)
            ),
            theme.dim,
        ));
    }
    Line::from(spans)
}

/// Rows that appear in the Gantt view: dates with a block, date ascending.
pub fn gantt_rows(intervals: &[SleepInterval]) -> Vec<SleepInterval> {
    let mut rows: Vec<SleepInterval> = intervals.iter().copied().filter(|i| i.has_sleep()).collect();
    rows.sort_by_key(|i| i.date);
    rows
}

/// Render the Gantt chart into `area`, starting at row `scroll`.
pub fn render_gantt_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    intervals: &[SleepInterval],
    tz_name: &str,
    scroll: usize,
    theme: &Theme,
) {
    let rows = gantt_rows(intervals);

    let mut lines = vec![axis_line(theme)];
    if rows.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("No inferred sleep", theme.warning)));
    } else {
        lines.extend(rows.iter().skip(scroll).map(|i| interval_line(i, theme)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(format!(" {} ", title), theme.header))
        .title_bottom(Span::styled(
            format!(" Hour of Day ({}) ", tz_name),
            theme.dim,
        ));

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use sleep_core::models::SleepBlock;

    fn interval(d: u32, block: Option<(u8, u8)>) -> SleepInterval {
        SleepInterval {
            date: NaiveDate::from_ymd_opt(2025, 1, d).unwrap(),
            block: block.map(|(start_hour, end_hour)| SleepBlock {
                start_hour,
                end_hour,
            }),
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_gantt_rows_only_blocks_sorted() {
        let rows = gantt_rows(&[
            interval(5, Some((1, 6))),
            interval(2, None),
            interval(1, Some((0, 5))),
        ]);
        let days: Vec<u32> = rows.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(days, vec![1, 5]);
    }

    #[test]
    fn test_interval_line_marks_block_hours() {
        let line = interval_line(&interval(1, Some((2, 4))), &Theme::dark());
        let cells: Vec<&str> = line.spans[1..=HOURS_PER_DAY]
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(cells[1], EMPTY_CELL);
        assert_eq!(cells[2], CELL);
        assert_eq!(cells[4], CELL);
        assert_eq!(cells[5], EMPTY_CELL);
    }

    #[test]
    fn test_render_gantt_view_shows_dates() {
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let data = vec![interval(1, Some((0, 6))), interval(2, Some((1, 7)))];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_gantt_view(frame, area, "Sleep", &data, "UTC", 0, &Theme::dark());
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("2025-01-01"));
        assert!(text.contains("2025-01-02"));
        assert!(text.contains("Hour of Day (UTC)"));
    }

    #[test]
    fn test_render_gantt_view_scroll_skips_rows() {
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let data = vec![interval(1, Some((0, 6))), interval(2, Some((1, 7)))];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_gantt_view(frame, area, "Sleep", &data, "UTC", 1, &Theme::dark());
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(!text.contains("2025-01-01"));
        assert!(text.contains("2025-01-02"));
    }

    #[test]
    fn test_render_gantt_view_empty_does_not_panic() {
        let backend = TestBackend::new(80, 10);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_gantt_view(frame, area, "Sleep", &[], "UTC", 0, &Theme::light());
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("No inferred sleep"));
    }
}
