//! Overview tab: KPI tiles, sessions-per-month line, charge histograms and
//! the weekday profile.

use dashboard_core::calendar::weekday_name;
use dashboard_core::formatting::{format_currency, format_optional};
use dashboard_core::models::WeekdayAverage;
use dashboard_data::analysis::DashboardSnapshot;
use dashboard_data::charts::HistogramBin;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::components::kpi_tiles::render_kpi_grid;
use crate::themes::Theme;

/// Render the whole overview tab.
pub fn render_overview(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let [tiles, line, histograms, weekdays] = Layout::vertical([
        Constraint::Length(12),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Length(9),
    ])
    .areas(area);

    render_kpi_grid(frame, tiles, &snapshot.kpi_tiles, theme);
    render_monthly_sessions(frame, line, &snapshot.monthly_sessions, theme);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(histograms);
    render_histogram(
        frame,
        left,
        "Session Charges",
        &snapshot.session_charge_histogram,
        theme,
    );
    render_histogram(
        frame,
        right,
        "Client Average Charge",
        &snapshot.client_average_histogram,
        theme,
    );

    render_weekday_bars(frame, weekdays, &snapshot.weekdays, theme);
}

/// "Sessions per Month" line chart.
pub fn render_monthly_sessions(
    frame: &mut Frame,
    area: Rect,
    series: &[(String, u64)],
    theme: &Theme,
) {
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_, sessions))| (i as f64, *sessions as f64))
        .collect();
    let max_sessions = series.iter().map(|(_, s)| *s).max().unwrap_or(0).max(1) as f64;
    let last_x = series.len().saturating_sub(1).max(1) as f64;

    // First, middle and last month keep the axis readable.
    let x_labels: Vec<Line> = match series {
        [] => Vec::new(),
        // The chart draws no x labels unless it has at least two.
        [only] => vec![Line::from(only.0.clone()), Line::from("")],
        _ => {
            let mid = series.len() / 2;
            vec![
                Line::from(series[0].0.clone()),
                Line::from(series[mid].0.clone()),
                Line::from(series[series.len() - 1].0.clone()),
            ]
        }
    };

    let dataset = Dataset::default()
        .name("Sessions")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_line)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(titled_block("Sessions per Month", theme))
        .x_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, last_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, max_sessions])
                .labels(vec![
                    Line::from("0"),
                    Line::from(format!("{}", max_sessions as u64)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Vertical histogram; the title carries the charge span.
pub fn render_histogram(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    bins: &[HistogramBin],
    theme: &Theme,
) {
    let span = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => format!(
            "{} ({} – {})",
            title,
            format_currency(first.lower),
            format_currency(last.upper)
        ),
        _ => format!("{} (no data)", title),
    };

    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            Bar::default()
                .value(bin.count)
                .text_value(String::new())
                .style(theme.chart_bar)
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(&span, theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);

    frame.render_widget(chart, area);
}

/// Average sessions per client day, Monday to Friday.
pub fn render_weekday_bars(
    frame: &mut Frame,
    area: Rect,
    weekdays: &[WeekdayAverage],
    theme: &Theme,
) {
    let bars: Vec<Bar> = weekdays
        .iter()
        .map(|w| {
            // Bar heights are integers, so scale to hundredths.
            let scaled = w.avg_sessions.map_or(0, |v| (v * 100.0).round() as u64);
            Bar::default()
                .value(scaled)
                .text_value(format_optional(w.avg_sessions, 2))
                .label(Line::from(&weekday_name(w.weekday)[..3]))
                .style(theme.chart_weekday)
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block("Avg Sessions by Weekday", theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2)
        .value_style(theme.value);

    frame.render_widget(chart, area);
}

fn titled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use dashboard_core::models::{DateRange, RecordSet};
    use dashboard_data::analysis::analyze;
    use dashboard_data::loader::load_path;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::Path;

    fn fixture_snapshot() -> DashboardSnapshot {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("dashboard-data")
            .join("fixtures")
            .join("sales_sample.csv");
        let records = load_path(&path).expect("fixture loads");
        analyze(&records, &DateRange::unbounded())
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_render_overview_does_not_panic() {
        let snapshot = fixture_snapshot();
        let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_overview(frame, frame.area(), &snapshot, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Sessions per Month"));
        assert!(text.contains("Avg Sessions by Weekday"));
        assert!(text.contains("Days Worked"));
    }

    #[test]
    fn test_render_overview_empty_snapshot_does_not_panic() {
        let snapshot = analyze(&RecordSet::default(), &DateRange::unbounded());
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        let theme = Theme::light();

        terminal
            .draw(|frame| render_overview(frame, frame.area(), &snapshot, &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("no data"));
    }

    #[test]
    fn test_render_weekday_bars_labels() {
        let weekdays = vec![
            WeekdayAverage {
                weekday: Weekday::Mon,
                avg_sessions: Some(2.5),
                avg_revenue: Some(210.0),
            },
            WeekdayAverage {
                weekday: Weekday::Fri,
                avg_sessions: None,
                avg_revenue: None,
            },
        ];
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let theme = Theme::classic();

        terminal
            .draw(|frame| render_weekday_bars(frame, frame.area(), &weekdays, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Mon"));
        assert!(text.contains("Fri"));
    }

    #[test]
    fn test_render_monthly_sessions_single_point() {
        let series = vec![("2024-06".to_string(), 11)];
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_monthly_sessions(frame, frame.area(), &series, &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("2024-06"));
    }
}
