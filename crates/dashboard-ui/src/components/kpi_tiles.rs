//! 3x3 grid of headline numbers.

use dashboard_data::charts::KpiTile;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

const GRID: usize = 3;

/// Render `tiles` at their grid positions inside `area`.
///
/// Cells with no tile stay blank. Tiles placed outside the grid are skipped.
pub fn render_kpi_grid(frame: &mut Frame, area: Rect, tiles: &[KpiTile], theme: &Theme) {
    let rows = Layout::vertical([Constraint::Ratio(1, GRID as u32); GRID]).split(area);

    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::horizontal([Constraint::Ratio(1, GRID as u32); GRID]).split(*row_area);
        for (c, cell_area) in cells.iter().enumerate() {
            if let Some(tile) = tiles
                .iter()
                .find(|t| t.row as usize == r && t.column as usize == c)
            {
                render_tile(frame, *cell_area, tile, theme);
            }
        }
    }
}

fn render_tile(frame: &mut Frame, area: Rect, tile: &KpiTile, theme: &Theme) {
    let body = vec![
        Line::from(Span::styled(tile.display(), theme.tile_value)),
        Line::from(Span::styled(tile.label, theme.label)),
    ];
    frame.render_widget(
        Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.tile_border),
        ),
        area,
    );
}
