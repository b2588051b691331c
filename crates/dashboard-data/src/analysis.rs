//! Dashboard pipeline.
//!
//! Filters a loaded [`RecordSet`] to the selected window and runs every
//! aggregate and chart builder over the result, returning a
//! [`DashboardSnapshot`] ready for the UI layer or the JSON export.

use chrono::Utc;
use dashboard_core::models::{
    AnnualRollup, ClientRollup, DateRange, KpiSummary, MonthlyRollup, PeriodRollup, RecordSet,
    WeekdayAverage,
};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::RecordAggregator;
use crate::charts::{self, HistogramBin, KpiTile, CLIENT_AVERAGE_BINS, SESSION_CHARGE_BINS};
use crate::filter::filter_by_range;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    /// ISO-8601 timestamp when this snapshot was generated.
    pub generated_at: String,
    /// Window the snapshot was computed over.
    pub range: DateRange,
    /// Records in the loaded set before filtering.
    pub records_loaded: usize,
    /// Records left after the date filter.
    pub records_in_range: usize,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// Everything the dashboard shows for one date window.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub metadata: SnapshotMetadata,
    pub kpis: KpiSummary,
    pub kpi_tiles: Vec<KpiTile>,
    pub monthly: Vec<MonthlyRollup>,
    pub annual: Vec<AnnualRollup>,
    /// Grand total row shown under the annual table.
    pub overall: PeriodRollup,
    pub clients: Vec<ClientRollup>,
    pub weekdays: Vec<WeekdayAverage>,
    pub monthly_sessions: Vec<(String, u64)>,
    pub session_charge_histogram: Vec<HistogramBin>,
    pub client_average_histogram: Vec<HistogramBin>,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Filter `records` to `range` and compute every aggregate over the result.
///
/// Nothing is cached: each call starts again from the full set.
pub fn analyze(records: &RecordSet, range: &DateRange) -> DashboardSnapshot {
    let started = std::time::Instant::now();

    let filtered = filter_by_range(records, range);

    let kpis = RecordAggregator::kpi_summary(&filtered);
    let monthly = RecordAggregator::monthly_rollup(&filtered);
    let clients = RecordAggregator::client_rollup(&filtered);

    let charges: Vec<f64> = filtered.iter().map(|r| r.total).collect();
    let client_averages: Vec<f64> = clients.iter().filter_map(|c| c.average_charged).collect();

    let snapshot = DashboardSnapshot {
        kpi_tiles: charts::kpi_tiles(&kpis),
        monthly_sessions: charts::monthly_sessions(&monthly),
        session_charge_histogram: charts::histogram(&charges, SESSION_CHARGE_BINS),
        client_average_histogram: charts::histogram(&client_averages, CLIENT_AVERAGE_BINS),
        annual: RecordAggregator::annual_rollup(&filtered),
        overall: RecordAggregator::overall_rollup(&filtered),
        weekdays: RecordAggregator::weekday_profile(&filtered),
        kpis,
        monthly,
        clients,
        metadata: SnapshotMetadata {
            generated_at: Utc::now().to_rfc3339(),
            range: *range,
            records_loaded: records.len(),
            records_in_range: filtered.len(),
            compute_time_seconds: started.elapsed().as_secs_f64(),
        },
    };

    debug!(
        "Snapshot over {} of {} records in {:.3}s",
        snapshot.metadata.records_in_range,
        snapshot.metadata.records_loaded,
        snapshot.metadata.compute_time_seconds
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_path;
    use chrono::NaiveDate;
    use std::path::Path;

    fn fixture() -> RecordSet {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("sales_sample.csv");
        load_path(&path).expect("fixture loads")
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_analyze_full_range() {
        let set = fixture();
        let snapshot = analyze(&set, &DateRange::unbounded());

        assert_eq!(snapshot.metadata.records_loaded, 124);
        assert_eq!(snapshot.metadata.records_in_range, 124);
        assert_eq!(snapshot.kpis.total_sessions, 124);
        assert_eq!(snapshot.monthly.len(), 12);
        assert_eq!(snapshot.annual.len(), 2);
        assert_eq!(snapshot.overall.sessions, 124);
        assert_eq!(snapshot.clients.len(), 9);
        assert_eq!(snapshot.kpi_tiles.len(), 7);
        assert_eq!(snapshot.weekdays.len(), 5);
        assert_eq!(snapshot.monthly_sessions.len(), 12);
        assert_eq!(snapshot.session_charge_histogram.len(), SESSION_CHARGE_BINS);
        assert_eq!(snapshot.client_average_histogram.len(), CLIENT_AVERAGE_BINS);

        let binned: u64 = snapshot.session_charge_histogram.iter().map(|b| b.count).sum();
        assert_eq!(binned, 124);
    }

    #[test]
    fn test_analyze_june_window() {
        let set = fixture();
        let range = DateRange::new(Some(d("2024-06-01")), Some(d("2024-06-30")));
        let snapshot = analyze(&set, &range);

        assert_eq!(snapshot.metadata.records_loaded, 124);
        assert_eq!(snapshot.metadata.records_in_range, 11);
        assert_eq!(snapshot.metadata.range, range);
        assert_eq!(snapshot.monthly.len(), 1);
        assert_eq!(snapshot.monthly[0].period, "2024-06");
        assert_eq!(snapshot.annual.len(), 1);
        assert_eq!(snapshot.annual[0].sessions, 11);
    }

    #[test]
    fn test_analyze_empty_window_uses_sentinels() {
        let set = fixture();
        let range = DateRange::new(Some(d("2030-01-01")), None);
        let snapshot = analyze(&set, &range);

        assert_eq!(snapshot.metadata.records_in_range, 0);
        assert!(snapshot.monthly.is_empty());
        assert!(snapshot.clients.is_empty());
        assert!(snapshot.session_charge_histogram.is_empty());
        assert_eq!(snapshot.kpis.avg_rate_charged, None);
        assert_eq!(snapshot.overall.average_charged, None);
    }

    #[test]
    fn test_snapshot_serializes_sentinels_as_null() {
        let snapshot = analyze(&RecordSet::default(), &DateRange::unbounded());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["kpis"]["avg_sessions_per_day"].is_null());
        assert_eq!(json["overall"]["period"], "TOTAL");
        assert_eq!(json["kpi_tiles"][5]["kind"], "currency");
        assert!(json["metadata"]["generated_at"].is_string());
    }
}
