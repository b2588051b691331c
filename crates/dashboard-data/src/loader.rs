//! Sales export loading for the Evergreen dashboard.
//!
//! Reads the practice-management system's sales report (CSV or a
//! spreadsheet workbook, from disk or from a browser-style upload payload),
//! drops the report columns the dashboard never uses and converts every row
//! into a typed [`Record`]. Loading is all-or-nothing: one bad row fails the
//! whole file.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use dashboard_core::calendar;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{Record, RecordSet};
use tracing::{debug, info};

// ── Column names ──────────────────────────────────────────────────────────────

pub const INVOICE_COLUMN: &str = "Invoice #";
pub const PURCHASE_DATE_COLUMN: &str = "Purchase Date";
pub const PATIENT_COLUMN: &str = "Patient Guid";
/// Charged amount. Becomes [`Record::total`].
pub const SUBTOTAL_COLUMN: &str = "Subtotal";
pub const COLLECTED_COLUMN: &str = "Collected";
pub const BALANCE_COLUMN: &str = "Balance";

/// Report columns that are discarded on load. Empty (unnamed) headers are
/// discarded too.
pub const DROPPED_COLUMNS: &[&str] = &[
    "Invoice Date",
    "Total",
    "Location",
    "Staff Member",
    "Income Category",
    "Payer",
    "Details",
];

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// How the bytes of a source are laid out, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated text.
    Delimited,
    /// Excel or OpenDocument workbook; only the first sheet is read.
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from a filename. Matching is case-insensitive.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "" => Err(DashboardError::UnsupportedFormat(name.to_string())),
            _ => Err(DashboardError::UnsupportedFormat(ext)),
        }
    }
}

// ── LoadSource ────────────────────────────────────────────────────────────────

/// Where a record set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// A file on disk.
    Path(PathBuf),
    /// An uploaded file: a `data:<mime>;base64,<data>` URL (or bare base64)
    /// plus the filename the user picked.
    Payload { contents: String, filename: String },
}

impl LoadSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn payload(contents: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::Payload {
            contents: contents.into(),
            filename: filename.into(),
        }
    }

    /// Short name for status lines, e.g. `"Sales_20240301_20250228.csv"`.
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Payload { filename, .. } => filename.clone(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `source` into a fresh [`RecordSet`].
pub fn load(source: &LoadSource) -> Result<RecordSet> {
    let records = match source {
        LoadSource::Path(path) => load_path(path)?,
        LoadSource::Payload { contents, filename } => load_payload(contents, filename)?,
    };
    info!(
        "Loaded {} records from {}",
        records.len(),
        source.display_name()
    );
    Ok(records)
}

/// Load a sales export from disk.
///
/// The extension is checked before the file is opened.
pub fn load_path(path: &Path) -> Result<RecordSet> {
    let format = SourceFormat::from_filename(&path.to_string_lossy())?;
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(bytes, format)
}

/// Load an uploaded sales export.
pub fn load_payload(contents: &str, filename: &str) -> Result<RecordSet> {
    let format = SourceFormat::from_filename(filename)?;
    let bytes = decode_payload(contents)?;
    parse_bytes(bytes, format)
}

/// Read delimited text from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<RecordSet> {
    let table = read_delimited(reader)?;
    normalize(table)
}

/// Decode an upload payload into raw file bytes.
///
/// Accepts `data:<mime>;base64,<data>` URLs and bare base64.
pub fn decode_payload(contents: &str) -> Result<Vec<u8>> {
    let trimmed = contents.trim();
    let encoded = match trimmed.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => {
            if !header.ends_with(";base64") {
                return Err(DashboardError::Decode(format!(
                    "expected a base64 data URL, got header {header:?}"
                )));
            }
            data
        }
        _ => trimmed,
    };

    STANDARD
        .decode(encoded.trim())
        .map_err(|e| DashboardError::Decode(e.to_string()))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Untyped cells as they come out of the file.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn parse_bytes(bytes: Vec<u8>, format: SourceFormat) -> Result<RecordSet> {
    let table = match format {
        SourceFormat::Delimited => {
            let text = String::from_utf8(bytes)
                .map_err(|e| DashboardError::Decode(format!("file is not UTF-8 text: {e}")))?;
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            read_delimited(text.as_bytes())?
        }
        SourceFormat::Spreadsheet => read_workbook(bytes)?,
    };
    normalize(table)
}

fn read_delimited<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

fn read_workbook(bytes: Vec<u8>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DashboardError::Decode(format!("unreadable workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::Spreadsheet("workbook has no worksheets".to_string()))?
        .map_err(|e| DashboardError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// Render a workbook cell the way the CSV export would have written it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // "2024-03-01T00:00:00" -> "2024-03-01"
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or(s).to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format(calendar::DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Positions of the columns a [`Record`] is built from.
struct ColumnIndex {
    invoice: usize,
    purchase_date: usize,
    patient: usize,
    subtotal: usize,
    collected: usize,
    balance: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            invoice: find(INVOICE_COLUMN)?,
            purchase_date: find(PURCHASE_DATE_COLUMN)?,
            patient: find(PATIENT_COLUMN)?,
            subtotal: find(SUBTOTAL_COLUMN)?,
            collected: find(COLLECTED_COLUMN)?,
            balance: find(BALANCE_COLUMN)?,
        })
    }
}

fn normalize(table: RawTable) -> Result<RecordSet> {
    let headers: Vec<String> = table.headers.iter().map(|h| h.trim().to_string()).collect();

    for header in &headers {
        if header.is_empty() || DROPPED_COLUMNS.contains(&header.as_str()) {
            debug!("Dropping report column {:?}", header);
        } else if !is_record_column(header) {
            debug!("Ignoring unexpected column {:?}", header);
        }
    }

    let index = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut blank_rows = 0usize;

    for (i, row) in table.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            blank_rows += 1;
            continue;
        }
        let row_number = i + 1;
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

        let raw_date = cell(index.purchase_date);
        let purchase_date =
            calendar::parse_date(raw_date).ok_or_else(|| DashboardError::MalformedDate {
                row: row_number,
                value: raw_date.to_string(),
            })?;

        records.push(Record {
            invoice_id: cell(index.invoice).trim().to_string(),
            patient_id: cell(index.patient).trim().to_string(),
            purchase_date,
            total: parse_amount(cell(index.subtotal), SUBTOTAL_COLUMN, row_number)?,
            collected: parse_amount(cell(index.collected), COLLECTED_COLUMN, row_number)?,
            balance: parse_amount(cell(index.balance), BALANCE_COLUMN, row_number)?,
        });
    }

    if blank_rows > 0 {
        debug!("Skipped {} blank rows", blank_rows);
    }

    Ok(RecordSet::new(records))
}

fn is_record_column(header: &str) -> bool {
    [
        INVOICE_COLUMN,
        PURCHASE_DATE_COLUMN,
        PATIENT_COLUMN,
        SUBTOTAL_COLUMN,
        COLLECTED_COLUMN,
        BALANCE_COLUMN,
    ]
    .contains(&header)
}

/// Parse a money cell. `$` and thousands separators are tolerated and an
/// empty cell reads as zero.
fn parse_amount(raw: &str, column: &str, row: usize) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DashboardError::InvalidAmount {
            column: column.to_string(),
            row,
            value: raw.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Invoice #,Invoice Date, Purchase Date ,Patient Guid,,Location,Staff Member,Income Category,Payer,Details,Subtotal,Total,Collected,Balance";

    fn row(invoice: u32, date: &str, patient: &str, subtotal: &str, collected: &str, balance: &str) -> String {
        format!(
            "{invoice},{date},{date},{patient},,Main Office,Dana Whitfield,Counselling,Client,Individual session,{subtotal},999.00,{collected},{balance}"
        )
    }

    fn csv_text(rows: &[String]) -> String {
        let mut text = String::from(HEADER);
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text.push('\n');
        text
    }

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(contents).expect("write");
        path
    }

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("sales_sample.csv")
    }

    // ── SourceFormat ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_filename("Sales.csv").unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_filename("Sales.XLSX").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(
            SourceFormat::from_filename("Sales.ods").unwrap(),
            SourceFormat::Spreadsheet
        );
    }

    #[test]
    fn test_format_unsupported_extension() {
        let err = SourceFormat::from_filename("Sales.txt").unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat(ref e) if e == "txt"));

        let err = SourceFormat::from_filename("Sales").unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat(_)));
    }

    // ── CSV normalisation ─────────────────────────────────────────────────────

    #[test]
    fn test_read_csv_builds_typed_records() {
        let text = csv_text(&[
            row(1001, "2024-03-01", "A", "100.00", "80.00", "20.00"),
            row(1002, "2024-03-01", "A", "50.00", "50.00", "0.00"),
        ]);
        let set = read_csv(text.as_bytes()).expect("load");

        assert_eq!(set.len(), 2);
        let first = &set.records()[0];
        assert_eq!(first.invoice_id, "1001");
        assert_eq!(first.patient_id, "A");
        assert_eq!(
            first.purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(first.collected, 80.0);
        assert_eq!(first.balance, 20.0);
    }

    #[test]
    fn test_subtotal_becomes_total() {
        // The report's own Total column (999.00 here) is discarded.
        let text = csv_text(&[row(1001, "2024-03-01", "A", "100.00", "100.00", "0.00")]);
        let set = read_csv(text.as_bytes()).expect("load");
        assert_eq!(set.records()[0].total, 100.0);
    }

    #[test]
    fn test_minimal_columns_are_enough() {
        let text = "Invoice #,Purchase Date,Patient Guid,Subtotal,Collected,Balance\n\
                    7,2024-04-02,B,95,95,0\n";
        let set = read_csv(text.as_bytes()).expect("load");
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].total, 95.0);
    }

    #[test]
    fn test_missing_required_column() {
        let text = "Invoice #,Purchase Date,Subtotal,Collected,Balance\n1,2024-04-02,95,95,0\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(ref c) if c == "Patient Guid"));
    }

    #[test]
    fn test_malformed_date_fails_whole_load() {
        let text = csv_text(&[
            row(1001, "2024-03-01", "A", "100.00", "100.00", "0.00"),
            row(1002, "03/02/2024", "B", "100.00", "100.00", "0.00"),
            row(1003, "2024-03-04", "C", "100.00", "100.00", "0.00"),
        ]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        match err {
            DashboardError::MalformedDate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "03/02/2024");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_amount_formats() {
        let text = csv_text(&[row(1, "2024-03-01", "A", "\"$1,200.00\"", "", "-40.00")]);
        let set = read_csv(text.as_bytes()).expect("load");
        let r = &set.records()[0];
        assert_eq!(r.total, 1200.0);
        assert_eq!(r.collected, 0.0);
        assert_eq!(r.balance, -40.0);
    }

    #[test]
    fn test_invalid_amount() {
        let text = csv_text(&[row(1, "2024-03-01", "A", "abc", "0", "0")]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidAmount { ref column, row: 1, .. } if column == "Subtotal"
        ));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let text = format!(
            "{}\n{}\n,,,,,,,,,,,,,\n",
            HEADER,
            row(1, "2024-03-01", "A", "60", "60", "0")
        );
        let set = read_csv(text.as_bytes()).expect("load");
        assert_eq!(set.len(), 1);
    }

    // ── Paths ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_path_csv() {
        let tmp = TempDir::new().expect("tempdir");
        let text = csv_text(&[row(1, "2024-03-01", "A", "60", "60", "0")]);
        let path = write_file(&tmp, "Sales.csv", text.as_bytes());

        let set = load(&LoadSource::path(&path)).expect("load");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_path_strips_bom() {
        let tmp = TempDir::new().expect("tempdir");
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend_from_slice(csv_text(&[row(1, "2024-03-01", "A", "60", "60", "0")]).as_bytes());
        let path = write_file(&tmp, "Sales.csv", &bytes);

        let set = load_path(&path).expect("load");
        assert_eq!(set.records()[0].invoice_id, "1");
    }

    #[test]
    fn test_load_path_unsupported_extension_not_opened() {
        // The file does not exist: the extension check must fail first.
        let err = load_path(Path::new("/nonexistent/Sales.txt")).unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = load_path(Path::new("/nonexistent/Sales.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    #[test]
    fn test_load_path_corrupt_workbook() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_file(&tmp, "Sales.xlsx", b"definitely not a zip archive");
        let err = load_path(&path).unwrap_err();
        assert!(matches!(err, DashboardError::Decode(_)));
    }

    #[test]
    fn test_load_fixture() {
        let set = load_path(&fixture_path()).expect("fixture loads");
        assert_eq!(set.len(), 124);
        assert_eq!(
            set.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 24).unwrap()
            ))
        );
        let charged: f64 = set.iter().map(|r| r.total).sum();
        assert!((charged - 11_175.0).abs() < 1e-9);
    }

    // ── Workbooks ─────────────────────────────────────────────────────────────

    fn workbook_fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("sales_sample.xlsx")
    }

    fn assert_workbook_records(set: &RecordSet) {
        assert_eq!(set.len(), 2);

        // Date-formatted serial 45352 and a numeric invoice cell.
        let first = &set.records()[0];
        assert_eq!(first.invoice_id, "1001");
        assert_eq!(first.patient_id, "6f1c0001-a1b2-4c3d-9e8f-000000000001");
        assert_eq!(
            first.purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(first.total, 100.0);
        assert_eq!(first.collected, 80.0);
        assert_eq!(first.balance, 20.0);

        // Date typed in as text and fractional amounts.
        let second = &set.records()[1];
        assert_eq!(second.invoice_id, "1002");
        assert_eq!(
            second.purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(second.total, 50.5);
        assert_eq!(second.collected, 50.0);
        assert_eq!(second.balance, 0.5);
    }

    #[test]
    fn test_load_path_workbook() {
        let set = load_path(&workbook_fixture_path()).expect("workbook loads");
        assert_workbook_records(&set);
    }

    #[test]
    fn test_load_payload_workbook() {
        let bytes = std::fs::read(workbook_fixture_path()).expect("read fixture");
        let contents = format!(
            "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,{}",
            STANDARD.encode(bytes)
        );
        let set = load(&LoadSource::payload(contents, "Sales.xlsx")).expect("load");
        assert_workbook_records(&set);
    }

    #[test]
    fn test_cell_text_matches_csv_rendering() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_text(&Data::Float(50.5)), "50.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String(" A ".to_string())), " A ");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2024-03-01T00:00:00".to_string())),
            "2024-03-01"
        );
    }

    // ── Payloads ──────────────────────────────────────────────────────────────

    #[test]
    fn test_load_payload_data_url() {
        let text = csv_text(&[row(1, "2024-03-01", "A", "60", "60", "0")]);
        let contents = format!("data:text/csv;base64,{}", STANDARD.encode(text));
        let set = load(&LoadSource::payload(contents, "Sales.csv")).expect("load");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_payload_bare_base64() {
        let text = csv_text(&[row(1, "2024-03-01", "A", "60", "60", "0")]);
        let set = load_payload(&STANDARD.encode(text), "Sales.csv").expect("load");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_payload_invalid_base64() {
        let err = load_payload("data:text/csv;base64,@@@not base64@@@", "Sales.csv").unwrap_err();
        assert!(matches!(err, DashboardError::Decode(_)));
    }

    #[test]
    fn test_load_payload_non_base64_data_url() {
        let err = load_payload("data:text/csv,Invoice%20%23", "Sales.csv").unwrap_err();
        assert!(matches!(err, DashboardError::Decode(_)));
    }

    #[test]
    fn test_load_payload_not_utf8() {
        let contents = STANDARD.encode([0xff, 0xfe, 0x00, 0x41]);
        let err = load_payload(&contents, "Sales.csv").unwrap_err();
        assert!(matches!(err, DashboardError::Decode(_)));
    }

    #[test]
    fn test_load_payload_unsupported_extension() {
        let contents = STANDARD.encode("anything");
        let err = load_payload(&contents, "notes.txt").unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat(ref e) if e == "txt"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            LoadSource::path("/exports/Sales_20240301_20250228.csv").display_name(),
            "Sales_20240301_20250228.csv"
        );
        assert_eq!(LoadSource::payload("", "upload.xlsx").display_name(), "upload.xlsx");
    }
}
