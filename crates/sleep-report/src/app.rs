//! Interactive terminal chart viewer.
//!
//! [`ChartApp`] owns the theme, the active view and the scroll offset; the
//! analysed intervals are borrowed for the lifetime of the event loop.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use sleep_core::models::{SleepInterval, SleepSummary};

use crate::gantt_view::{self, gantt_rows};
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the viewer is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Gantt,
    Table,
}

impl ViewMode {
    fn toggled(self) -> Self {
        match self {
            ViewMode::Gantt => ViewMode::Table,
            ViewMode::Table => ViewMode::Gantt,
        }
    }
}

// ── ChartApp ──────────────────────────────────────────────────────────────────

pub struct ChartApp<'a> {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub title: String,
    /// IANA name of the reference timezone.
    pub timezone: String,
    pub scroll: usize,
    pub should_quit: bool,
    intervals: &'a [SleepInterval],
    summary: &'a SleepSummary,
}

impl<'a> ChartApp<'a> {
    pub fn new(
        theme_name: &str,
        title: impl Into<String>,
        timezone: impl Into<String>,
        intervals: &'a [SleepInterval],
        summary: &'a SleepSummary,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode: ViewMode::Gantt,
            title: title.into(),
            timezone: timezone.into(),
            scroll: 0,
            should_quit: false,
            intervals,
            summary,
        }
    }

    /// Run the viewer until `q`, `Esc` or `Ctrl+C`.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.view_mode = self.view_mode.toggled();
                self.scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.scroll + 1 < self.row_count() {
                    self.scroll += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
    }

    /// Rows available for scrolling in the current view.
    fn row_count(&self) -> usize {
        match self.view_mode {
            ViewMode::Gantt => gantt_rows(self.intervals).len(),
            ViewMode::Table => self.intervals.len(),
        }
    }

    /// Render the current view plus a one-line key hint.
    pub fn render(&self, frame: &mut Frame) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

        match self.view_mode {
            ViewMode::Gantt => gantt_view::render_gantt_view(
                frame,
                body,
                &self.title,
                self.intervals,
                &self.timezone,
                self.scroll,
                &self.theme,
            ),
            ViewMode::Table if self.intervals.is_empty() => {
                table_view::render_no_data(frame, body, &self.theme)
            }
            ViewMode::Table => table_view::render_table_view(
                frame,
                body,
                self.intervals,
                self.summary,
                self.scroll,
                &self.theme,
            ),
        }

        let hint = Line::from(vec![
            Span::styled(" Tab ", self.theme.value),
            Span::styled("switch view  ", self.theme.dim),
            Span::styled("↑/↓ ", self.theme.value),
            Span::styled("scroll  ", self.theme.dim),
            Span::styled("q ", self.theme.value),
            Span::styled("quit", self.theme.dim),
        ]);
        frame.render_widget(Paragraph::new(hint), footer);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
