//! Calendar helpers shared by the loader, the aggregator and the UI.

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::error::{DashboardError, Result};

/// The only accepted date pattern, for data and for caller-supplied bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekdays shown on the day-of-week chart, in display order.
pub const WORK_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Parse a `YYYY-MM-DD` string. Surrounding whitespace is ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse an optional date-range bound supplied by a caller.
///
/// Empty strings count as "no bound".
pub fn parse_bound(s: Option<&str>) -> Result<Option<NaiveDate>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v)
            .map(Some)
            .ok_or_else(|| DashboardError::InvalidDateBound(v.to_string())),
    }
}

/// `(year, month)` sort key for monthly grouping.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Label for a month key, e.g. `"2024-03"`.
pub fn month_label((year, month): (i32, u32)) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Label for a year, e.g. `"2024"`.
pub fn year_label(year: i32) -> String {
    format!("{:04}", year)
}

/// `(iso_year, iso_week)` key. Weeks run Monday to Sunday.
pub fn week_key(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Full English weekday name, e.g. `"Monday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Move `date` by `months` calendar months (negative goes back).
///
/// Days past the end of the target month clamp to its last day.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
