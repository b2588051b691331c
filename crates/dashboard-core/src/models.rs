use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// One invoice / session line from the practice's sales export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Source `Invoice #`.
    pub invoice_id: String,
    /// Source `Patient Guid`.
    pub patient_id: String,
    /// Source `Purchase Date`.
    pub purchase_date: NaiveDate,
    /// Charged amount. Read from the `Subtotal` column.
    pub total: f64,
    /// Amount collected so far.
    pub collected: f64,
    /// Outstanding balance.
    pub balance: f64,
}

/// An ordered, immutable collection of [`Record`]s.
///
/// Filtering produces a new set; nothing mutates a set after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest purchase dates, or `None` for an empty set.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.purchase_date).min()?;
        let last = self.records.iter().map(|r| r.purchase_date).max()?;
        Some((first, last))
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Inclusive date window. A missing bound does not restrict that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Build a range from caller-supplied `YYYY-MM-DD` strings.
    ///
    /// Absent or empty strings leave that side open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> crate::Result<Self> {
        Ok(Self::new(
            calendar::parse_bound(start)?,
            calendar::parse_bound(end)?,
        ))
    }

    /// A range covering every date.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= date) && self.end.map_or(true, |e| date <= e)
    }
}

/// Aggregate over one calendar period (a month or a year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRollup {
    /// `"YYYY-MM"` for months, `"YYYY"` for years.
    pub period: String,
    pub sessions: u64,
    pub unique_clients: u64,
    pub total_charged: f64,
    pub total_collected: f64,
    pub total_outstanding: f64,
    /// `None` only for a zero-session group.
    pub average_charged: Option<f64>,
    pub average_collected: Option<f64>,
    pub average_outstanding: Option<f64>,
}

pub type MonthlyRollup = PeriodRollup;
pub type AnnualRollup = PeriodRollup;

/// Aggregate over every session of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRollup {
    pub patient_id: String,
    pub sessions: u64,
    pub total_charged: f64,
    pub total_collected: f64,
    pub total_outstanding: f64,
    /// Mean charged per session, rounded to cents.
    pub average_charged: Option<f64>,
    /// Mean collected per session, rounded to cents.
    pub average_collected: Option<f64>,
    /// Mean outstanding per session, unrounded.
    pub average_outstanding: Option<f64>,
}

/// Headline scalars over a whole record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Distinct purchase dates.
    pub days_with_clients: u64,
    /// Distinct ISO weeks with at least one session.
    ///
    /// The practice counts one non-client admin day (a Friday) for every
    /// week it sees clients, so this doubles as "Fridays worked".
    pub weeks_worked: u64,
    /// `days_with_clients + weeks_worked`.
    pub days_worked: u64,
    pub total_sessions: u64,
    /// Sessions per client day, rounded to cents. `None` for an empty set.
    pub avg_sessions_per_day: Option<f64>,
    pub unique_clients: u64,
    /// Mean charged amount per session. `None` for an empty set.
    pub avg_rate_charged: Option<f64>,
    /// Sum of collected amounts.
    pub total_revenue: f64,
}

/// Average daily activity for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    /// Mean sessions per client day falling on this weekday.
    pub avg_sessions: Option<f64>,
    /// Mean charged revenue per client day falling on this weekday.
    pub avg_revenue: Option<f64>,
}
