//! Application state and TUI event loop for the Evergreen dashboard.
//!
//! [`App`] owns the theme, the selected tab and the latest snapshot computed
//! from the shared [`DashboardSession`]. Key presses move the date window,
//! switch tabs or reload the source file; every change recomputes the
//! snapshot from scratch.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use dashboard_core::calendar::shift_months;
use dashboard_core::DashboardError;
use dashboard_data::analysis::DashboardSnapshot;
use dashboard_runtime::session::DashboardSession;

use crate::chart_view;
use crate::components::header::Header;
use crate::table_view;
use crate::themes::Theme;

const HELP: &str = "Tab switch  [ ] start  { } end  r reset  l reload  q quit";

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which view the dashboard body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Monthly,
    Annual,
    Clients,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Monthly, Tab::Annual, Tab::Clients];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Monthly => "Monthly",
            Tab::Annual => "Annual",
            Tab::Clients => "Clients",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Tone of a [`Status`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line message shown under the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }

    /// Footer style for this status under `theme`.
    pub fn style(&self, theme: &Theme) -> Style {
        match self.kind {
            StatusKind::Info => theme.info,
            StatusKind::Success => theme.success,
            StatusKind::Error => theme.error,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    pub session: Arc<DashboardSession>,
    /// Latest snapshot, `None` until a file is loaded.
    pub snapshot: Option<DashboardSnapshot>,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, session: Arc<DashboardSession>) -> Self {
        let mut app = Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Overview,
            session,
            snapshot: None,
            status: None,
            should_quit: false,
        };
        app.refresh();
        app
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// on the current thread.
    pub async fn run(mut self) -> io::Result<()> {
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
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
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
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.previous(),
            KeyCode::Char('[') => self.shift_start(-1),
            KeyCode::Char(']') => self.shift_start(1),
            KeyCode::Char('{') => self.shift_end(-1),
            KeyCode::Char('}') => self.shift_end(1),
            KeyCode::Char('r') => self.reset_range(),
            KeyCode::Char('l') => self.reload(),
            _ => {}
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// Recompute the snapshot from the session.
    pub fn refresh(&mut self) {
        match self.session.snapshot() {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(DashboardError::NoData) => self.snapshot = None,
            Err(e) => self.status = Some(Status::error(e.to_string())),
        }
    }

    fn shift_start(&mut self, months: i32) {
        let Some((first, _)) = self.session.data_bounds() else {
            self.status = Some(Status::error("No data loaded"));
            return;
        };
        let range = self.session.range();
        let start = shift_months(range.start.unwrap_or(first), months);
        self.session.set_range(Some(start), range.end);
        self.refresh();
    }

    fn shift_end(&mut self, months: i32) {
        let Some((_, last)) = self.session.data_bounds() else {
            self.status = Some(Status::error("No data loaded"));
            return;
        };
        let range = self.session.range();
        let end = shift_months(range.end.unwrap_or(last), months);
        self.session.set_range(range.start, Some(end));
        self.refresh();
    }

    fn reset_range(&mut self) {
        match self.session.reset_range() {
            Ok(_) => {
                self.status = Some(Status::info("Date range reset"));
                self.refresh();
            }
            Err(e) => self.status = Some(Status::error(e.to_string())),
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(_) => {
                let name = self.session.source_name().unwrap_or_default();
                self.status = Some(Status::success(format!("Reloaded {}", name)));
                self.refresh();
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed; keeping previous data");
                self.status = Some(Status::error(format!("Reload failed: {}", e)));
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, body, footer] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let source = self.session.source_name();
        let header = Header::new(source.as_deref(), self.session.range(), &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active);
        frame.render_widget(tabs, tabs_area);

        match &self.snapshot {
            None => table_view::render_no_data(
                frame,
                body,
                "Pass a sales export (.csv, .xlsx) on the command line",
                &self.theme,
            ),
            Some(snapshot) => match self.tab {
                Tab::Overview => chart_view::render_overview(frame, body, snapshot, &self.theme),
                Tab::Monthly => table_view::render_period_table(
                    frame,
                    body,
                    "Monthly",
                    &snapshot.monthly,
                    None,
                    &self.theme,
                ),
                Tab::Annual => table_view::render_period_table(
                    frame,
                    body,
                    "Annual",
                    &snapshot.annual,
                    Some(&snapshot.overall),
                    &self.theme,
                ),
                Tab::Clients => {
                    table_view::render_client_table(frame, body, &snapshot.clients, &self.theme)
                }
            },
        }

        let footer_line = match &self.status {
            Some(status) => Line::from(Span::styled(status.text.clone(), status.style(&self.theme))),
            None => Line::from(Span::styled(HELP, self.theme.dim)),
        };
        frame.render_widget(Paragraph::new(footer_line), footer);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
