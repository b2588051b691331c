//! Purchase-date windowing over a [`RecordSet`].

use chrono::NaiveDate;
use dashboard_core::models::{DateRange, RecordSet};
use tracing::debug;

/// Keep records whose purchase date lies in `[start, end]`.
///
/// Both bounds are inclusive and an absent bound leaves that side open.
/// Relative order is preserved and `records` is left untouched. A start
/// after the end selects nothing.
pub fn filter_by_date_range(
    records: &RecordSet,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> RecordSet {
    filter_by_range(records, &DateRange::new(start, end))
}

/// [`filter_by_date_range`] taking a prepared [`DateRange`].
pub fn filter_by_range(records: &RecordSet, range: &DateRange) -> RecordSet {
    if range.is_unbounded() {
        return records.clone();
    }

    let filtered: RecordSet = records
        .iter()
        .filter(|r| range.contains(r.purchase_date))
        .cloned()
        .collect();

    debug!(
        "Date filter {:?}..={:?} kept {} of {} records",
        range.start,
        range.end,
        filtered.len(),
        records.len()
    );
    filtered
}
