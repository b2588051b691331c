use crate::themes::Theme;
use dashboard_core::models::DateRange;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const LEAVES: &str = "❦ ❧";

/// Dashboard header rendering four lines:
///
/// 1. Practice title with decorations.
/// 2. A 60-column `=` separator.
/// 3. Source file and date window in `[ source | start → end ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Display name of the loaded export, `None` before anything is loaded.
    pub source: Option<&'a str>,
    pub range: DateRange,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: Option<&'a str>, range: DateRange, theme: &'a Theme) -> Self {
        Self {
            source,
            range,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(LEAVES, self.theme.header_accent),
                Span::styled(" EVERGREEN COUNSELLING SALES DASHBOARD ", self.theme.header),
                Span::styled(LEAVES, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(
                    self.source.unwrap_or("no file loaded").to_string(),
                    self.theme.value,
                ),
                Span::styled(" | ", self.theme.label),
                Span::styled(range_label(&self.range), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

/// `"2024-06-01 → 2024-06-30"`, with `…` for an open side.
pub fn range_label(range: &DateRange) -> String {
    let side = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "…".to_string())
    };
    format!("{} → {}", side(range.start), side(range.end))
}
