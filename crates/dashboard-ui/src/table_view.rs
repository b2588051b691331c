//! Monthly, annual and per-client tables.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per period
//! (or client). Period tables end with a highlighted totals row.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{self, format_currency, format_optional_currency};
use dashboard_core::models::{ClientRollup, PeriodRollup};

use crate::themes::Theme;

const PERIOD_HEADERS: [&str; 9] = [
    "Period",
    "Sessions",
    "Clients",
    "Charged",
    "Collected",
    "Outstanding",
    "Avg Charged",
    "Avg Collected",
    "Avg Outstanding",
];

const CLIENT_HEADERS: [&str; 8] = [
    "Client",
    "Sessions",
    "Charged",
    "Collected",
    "Outstanding",
    "Avg Charged",
    "Avg Collected",
    "Avg Outstanding",
];

/// Render a monthly or annual rollup table into `area`.
///
/// `total` is appended as a highlighted last row when present.
pub fn render_period_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[PeriodRollup],
    total: Option<&PeriodRollup>,
    theme: &Theme,
) {
    let header = header_row(&PERIOD_HEADERS, theme);

    let mut all_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| period_row(row, theme).style(alternating(i, theme)))
        .collect();

    if let Some(total) = total {
        all_rows.push(period_row(total, theme).style(theme.table_total));
    }

    let widths = [
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(16),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(bordered(title, theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the per-client table into `area`.
///
/// Patient identifiers are long GUIDs; the first column takes what is left.
pub fn render_client_table(frame: &mut Frame, area: Rect, rows: &[ClientRollup], theme: &Theme) {
    let header = header_row(&CLIENT_HEADERS, theme);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(vec![
                Cell::from(row.patient_id.clone()),
                Cell::from(formatting::format_number(row.sessions as f64, 0)),
                Cell::from(format_currency(row.total_charged)),
                Cell::from(format_currency(row.total_collected)),
                Cell::from(format_currency(row.total_outstanding))
                    .style(theme.balance_style(row.total_outstanding)),
                Cell::from(format_optional_currency(row.average_charged)),
                Cell::from(format_optional_currency(row.average_collected)),
                Cell::from(format_optional_currency(row.average_outstanding)),
            ])
            .style(alternating(i, theme))
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(16),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(bordered("Clients", theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when there is nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No sales data", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(bordered("Evergreen Dashboard", theme)),
        area,
    );
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn period_row<'a>(row: &PeriodRollup, theme: &Theme) -> Row<'a> {
    Row::new(vec![
        Cell::from(row.period.clone()),
        Cell::from(formatting::format_number(row.sessions as f64, 0)),
        Cell::from(formatting::format_number(row.unique_clients as f64, 0)),
        Cell::from(format_currency(row.total_charged)),
        Cell::from(format_currency(row.total_collected)),
        Cell::from(format_currency(row.total_outstanding))
            .style(theme.balance_style(row.total_outstanding)),
        Cell::from(format_optional_currency(row.average_charged)),
        Cell::from(format_optional_currency(row.average_collected)),
        Cell::from(format_optional_currency(row.average_outstanding)),
    ])
}

fn header_row<'a>(labels: &[&'a str], theme: &Theme) -> Row<'a> {
    Row::new(
        labels
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1)
}

fn alternating(index: usize, theme: &Theme) -> ratatui::style::Style {
    if index % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    }
}

fn bordered<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
