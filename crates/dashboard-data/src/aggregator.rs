//! Monthly, annual and per-client rollups plus the KPI summary.
//!
//! Every function is pure: it takes a [`RecordSet`] and builds a fresh result.
//! Grouping keys with no records never appear, and every average divides by
//! the session count of its own group.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use dashboard_core::calendar::{self, WORK_WEEK};
use dashboard_core::formatting::ratio;
use dashboard_core::models::{
    AnnualRollup, ClientRollup, KpiSummary, MonthlyRollup, PeriodRollup, Record, RecordSet,
    WeekdayAverage,
};

/// Label of the grand-total row produced by [`RecordAggregator::overall_rollup`].
pub const TOTAL_LABEL: &str = "TOTAL";

// ── PeriodStats ───────────────────────────────────────────────────────────────

/// Running sums for one group of records.
#[derive(Debug, Clone, Default)]
struct PeriodStats<'a> {
    sessions: u64,
    clients: HashSet<&'a str>,
    charged: f64,
    collected: f64,
    outstanding: f64,
}

impl<'a> PeriodStats<'a> {
    fn add_record(&mut self, record: &'a Record) {
        self.sessions += 1;
        self.clients.insert(record.patient_id.as_str());
        self.charged += record.total;
        self.collected += record.collected;
        self.outstanding += record.balance;
    }

    fn into_rollup(self, period: String) -> PeriodRollup {
        PeriodRollup {
            period,
            sessions: self.sessions,
            unique_clients: self.clients.len() as u64,
            total_charged: self.charged,
            total_collected: self.collected,
            total_outstanding: self.outstanding,
            average_charged: ratio(self.charged, self.sessions),
            average_collected: ratio(self.collected, self.sessions),
            average_outstanding: ratio(self.outstanding, self.sessions),
        }
    }
}

// ── RecordAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that groups sales records.
pub struct RecordAggregator;

impl RecordAggregator {
    /// One rollup per calendar month present, oldest first, labelled `"YYYY-MM"`.
    pub fn monthly_rollup(records: &RecordSet) -> Vec<MonthlyRollup> {
        Self::rollup_by(records, calendar::month_key, calendar::month_label)
    }

    /// One rollup per calendar year present, oldest first, labelled `"YYYY"`.
    pub fn annual_rollup(records: &RecordSet) -> Vec<AnnualRollup> {
        Self::rollup_by(records, |d| d.year(), calendar::year_label)
    }

    /// A single rollup over the whole set, labelled [`TOTAL_LABEL`].
    pub fn overall_rollup(records: &RecordSet) -> PeriodRollup {
        let mut stats = PeriodStats::default();
        for record in records {
            stats.add_record(record);
        }
        stats.into_rollup(TOTAL_LABEL.to_string())
    }

    /// One rollup per patient, sorted by patient id.
    pub fn client_rollup(records: &RecordSet) -> Vec<ClientRollup> {
        let mut map: BTreeMap<&str, PeriodStats> = BTreeMap::new();
        for record in records {
            map.entry(record.patient_id.as_str())
                .or_default()
                .add_record(record);
        }

        map.into_iter()
            .map(|(patient, stats)| ClientRollup {
                patient_id: patient.to_string(),
                sessions: stats.sessions,
                total_charged: stats.charged,
                total_collected: stats.collected,
                total_outstanding: stats.outstanding,
                average_charged: ratio(stats.charged, stats.sessions),
                average_collected: ratio(stats.collected, stats.sessions),
                average_outstanding: (stats.sessions > 0)
                    .then(|| stats.outstanding / stats.sessions as f64),
            })
            .collect()
    }

    /// Headline numbers over the whole set.
    pub fn kpi_summary(records: &RecordSet) -> KpiSummary {
        let days: HashSet<NaiveDate> = records.iter().map(|r| r.purchase_date).collect();
        let weeks: HashSet<(i32, u32)> = days.iter().map(|d| calendar::week_key(*d)).collect();
        let clients: HashSet<&str> = records.iter().map(|r| r.patient_id.as_str()).collect();

        let total_sessions = records.len() as u64;
        let days_with_clients = days.len() as u64;
        let weeks_worked = weeks.len() as u64;
        let charged: f64 = records.iter().map(|r| r.total).sum();

        KpiSummary {
            days_with_clients,
            weeks_worked,
            days_worked: days_with_clients + weeks_worked,
            total_sessions,
            avg_sessions_per_day: ratio(total_sessions as f64, days_with_clients),
            unique_clients: clients.len() as u64,
            avg_rate_charged: (total_sessions > 0).then(|| charged / total_sessions as f64),
            total_revenue: records.iter().map(|r| r.collected).sum(),
        }
    }

    /// Average sessions and charged revenue per client day, Monday to Friday.
    ///
    /// Each purchase date counts once for its weekday; weekend dates are
    /// left out of the profile.
    pub fn weekday_profile(records: &RecordSet) -> Vec<WeekdayAverage> {
        let mut per_day: BTreeMap<NaiveDate, (u64, f64)> = BTreeMap::new();
        for record in records {
            let day = per_day.entry(record.purchase_date).or_insert((0, 0.0));
            day.0 += 1;
            day.1 += record.total;
        }

        let mut per_weekday: HashMap<Weekday, (u64, u64, f64)> = HashMap::new();
        for (date, (sessions, revenue)) in per_day {
            let slot = per_weekday.entry(date.weekday()).or_insert((0, 0, 0.0));
            slot.0 += 1;
            slot.1 += sessions;
            slot.2 += revenue;
        }

        WORK_WEEK
            .iter()
            .map(|&weekday| {
                let (days, sessions, revenue) =
                    per_weekday.get(&weekday).copied().unwrap_or((0, 0, 0.0));
                WeekdayAverage {
                    weekday,
                    avg_sessions: (days > 0).then(|| sessions as f64 / days as f64),
                    avg_revenue: (days > 0).then(|| revenue / days as f64),
                }
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic grouping driver. `key_fn` maps a purchase date to an ordered
    /// group key and `label_fn` renders that key.
    fn rollup_by<K: Ord + Copy>(
        records: &RecordSet,
        key_fn: impl Fn(NaiveDate) -> K,
        label_fn: impl Fn(K) -> String,
    ) -> Vec<PeriodRollup> {
        let mut map: BTreeMap<K, PeriodStats> = BTreeMap::new();
        for record in records {
            map.entry(key_fn(record.purchase_date))
                .or_default()
                .add_record(record);
        }

        map.into_iter()
            .map(|(key, stats)| stats.into_rollup(label_fn(key)))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
