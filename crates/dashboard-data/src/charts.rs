//! Chart-ready series built from aggregates.
//!
//! These sit at the presentation boundary: the UI and the JSON export both
//! read them, so layout and binning decisions live here and nowhere else.

use dashboard_core::formatting::{format_optional, format_optional_currency};
use dashboard_core::models::{KpiSummary, PeriodRollup};
use serde::Serialize;

/// Bins for the per-session charge histogram.
pub const SESSION_CHARGE_BINS: usize = 40;

/// Bins for the per-client average charge histogram.
pub const CLIENT_AVERAGE_BINS: usize = 30;

// ── KPI tiles ─────────────────────────────────────────────────────────────────

/// How a tile value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Count,
    Decimal,
    Currency,
}

/// One headline number placed on the 3x3 KPI grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiTile {
    pub label: &'static str,
    pub value: Option<f64>,
    pub kind: TileKind,
    pub row: u8,
    pub column: u8,
}

impl KpiTile {
    /// Display text, `n/a` when the value is undefined.
    pub fn display(&self) -> String {
        match self.kind {
            TileKind::Count => format_optional(self.value, 0),
            TileKind::Decimal => format_optional(self.value, 2),
            TileKind::Currency => format_optional_currency(self.value),
        }
    }
}

/// Lay out the KPI summary as seven tiles, row-major.
pub fn kpi_tiles(kpis: &KpiSummary) -> Vec<KpiTile> {
    vec![
        tile("Days Worked", Some(kpis.days_worked as f64), TileKind::Count, 0, 0),
        tile(
            "Days with Clients",
            Some(kpis.days_with_clients as f64),
            TileKind::Count,
            0,
            1,
        ),
        tile(
            "Total Sessions",
            Some(kpis.total_sessions as f64),
            TileKind::Count,
            0,
            2,
        ),
        tile(
            "Avg Sessions per Day",
            kpis.avg_sessions_per_day,
            TileKind::Decimal,
            1,
            0,
        ),
        tile(
            "Unique Clients",
            Some(kpis.unique_clients as f64),
            TileKind::Count,
            1,
            1,
        ),
        tile(
            "Avg Rate Charged",
            kpis.avg_rate_charged,
            TileKind::Currency,
            1,
            2,
        ),
        tile(
            "Total Revenue",
            Some(kpis.total_revenue),
            TileKind::Currency,
            2,
            1,
        ),
    ]
}

fn tile(label: &'static str, value: Option<f64>, kind: TileKind, row: u8, column: u8) -> KpiTile {
    KpiTile {
        label,
        value,
        kind,
        row,
        column,
    }
}

// ── Histograms ────────────────────────────────────────────────────────────────

/// One histogram bucket covering `[lower, upper)`; the last bucket is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Equal-width histogram over `[min(0, min), max]`.
///
/// The x axis is anchored at zero so charge distributions line up across
/// date windows. Returns no bins for empty input or `nbins == 0`. When every
/// value sits on the lower edge a single bin holds them all.
pub fn histogram(values: &[f64], nbins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || nbins == 0 {
        return Vec::new();
    }

    let lower = finite.iter().copied().fold(0.0_f64, f64::min);
    let upper = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if upper <= lower {
        return vec![HistogramBin {
            lower,
            upper: lower,
            count: finite.len() as u64,
        }];
    }

    let width = (upper - lower) / nbins as f64;
    let mut bins: Vec<HistogramBin> = (0..nbins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == nbins {
                upper
            } else {
                lower + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in finite {
        let idx = (((v - lower) / width).floor() as usize).min(nbins - 1);
        bins[idx].count += 1;
    }
    bins
}

// ── Line series ───────────────────────────────────────────────────────────────

/// `(month label, sessions)` points for the "Sessions per Month" line.
pub fn monthly_sessions(months: &[PeriodRollup]) -> Vec<(String, u64)> {
    months
        .iter()
        .map(|m| (m.period.clone(), m.sessions))
        .collect()
}
