//! Session context for the dashboard.
//!
//! Holds the currently loaded [`RecordSet`] and the selected date window.
//! An upload parses its source outside any lock and then replaces the set
//! wholesale, so readers see either the old set or the new one and a failed
//! upload leaves everything as it was.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use dashboard_core::models::{DateRange, RecordSet};
use dashboard_core::{DashboardError, Result};
use dashboard_data::analysis::{analyze, DashboardSnapshot};
use dashboard_data::loader::{self, LoadSource};

// ── LoadedData ────────────────────────────────────────────────────────────────

/// A record set together with where and when it was loaded.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: Arc<RecordSet>,
    pub source: LoadSource,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedData {
    /// Window spanning every purchase date in the set.
    fn full_range(&self) -> DateRange {
        match self.records.date_bounds() {
            Some((first, last)) => DateRange::new(Some(first), Some(last)),
            None => DateRange::unbounded(),
        }
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

/// Explicit replacement for a process-wide "current data" slot.
///
/// Locks are always taken data first, then range.
///
/// # Example
/// ```no_run
/// use dashboard_data::loader::LoadSource;
/// use dashboard_runtime::session::DashboardSession;
///
/// let session = DashboardSession::new();
/// session.upload(&LoadSource::path("Sales.csv")).unwrap();
/// let snapshot = session.snapshot().unwrap();
/// println!("{} sessions", snapshot.kpis.total_sessions);
/// ```
#[derive(Debug, Default)]
pub struct DashboardSession {
    data: RwLock<Option<LoadedData>>,
    range: RwLock<DateRange>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Load `source` and make it the current set.
    ///
    /// The selected window is reset to the new data's bounds and returned.
    /// On any error the previous set and window are kept.
    pub fn upload(&self, source: &LoadSource) -> Result<DateRange> {
        let records = match loader::load(source) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(source = %source.display_name(), error = %e, "upload rejected");
                return Err(e);
            }
        };

        let loaded = LoadedData {
            records: Arc::new(records),
            source: source.clone(),
            loaded_at: Utc::now(),
        };
        let range = loaded.full_range();

        let mut data = write(&self.data);
        let mut current_range = write(&self.range);
        *data = Some(loaded);
        *current_range = range;

        tracing::info!(
            source = %source.display_name(),
            start = ?range.start,
            end = ?range.end,
            "record set replaced"
        );
        Ok(range)
    }

    /// Load the current source again, e.g. after the file changed on disk.
    pub fn reload(&self) -> Result<DateRange> {
        let source = read(&self.data)
            .as_ref()
            .map(|d| d.source.clone())
            .ok_or(DashboardError::NoData)?;
        self.upload(&source)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Shared handle to the current set, or `None` before the first upload.
    pub fn records(&self) -> Option<Arc<RecordSet>> {
        read(&self.data).as_ref().map(|d| Arc::clone(&d.records))
    }

    /// Display name of the current source.
    pub fn source_name(&self) -> Option<String> {
        read(&self.data).as_ref().map(|d| d.source.display_name())
    }

    /// When the current set was loaded.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        read(&self.data).as_ref().map(|d| d.loaded_at)
    }

    /// First and last purchase dates of the current set.
    pub fn data_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        read(&self.data)
            .as_ref()
            .and_then(|d| d.records.date_bounds())
    }

    /// The selected window.
    pub fn range(&self) -> DateRange {
        *read(&self.range)
    }

    // ── Window ────────────────────────────────────────────────────────────

    /// Select a new window. Either side may be open.
    pub fn set_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let range = DateRange::new(start, end);
        *write(&self.range) = range;
        tracing::debug!(start = ?range.start, end = ?range.end, "date range selected");
    }

    /// Reset the window to the bounds of the current set.
    pub fn reset_range(&self) -> Result<DateRange> {
        let data = read(&self.data);
        let loaded = data.as_ref().ok_or(DashboardError::NoData)?;
        let range = loaded.full_range();
        *write(&self.range) = range;
        Ok(range)
    }

    // ── Analysis ──────────────────────────────────────────────────────────

    /// Compute the dashboard over the current set and window.
    pub fn snapshot(&self) -> Result<DashboardSnapshot> {
        let records = self.records().ok_or(DashboardError::NoData)?;
        let range = self.range();
        Ok(analyze(&records, &range))
    }
}

// ── Lock helpers ──────────────────────────────────────────────────────────────

// Every write replaces a value whole, so a poisoned lock still holds a
// consistent value.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
