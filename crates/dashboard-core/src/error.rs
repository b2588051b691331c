use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Evergreen dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The file extension is neither delimited text nor a spreadsheet.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// An uploaded payload could not be decoded into bytes or text.
    #[error("Failed to decode upload: {0}")]
    Decode(String),

    /// A purchase date did not match `YYYY-MM-DD`.
    #[error("Malformed purchase date on row {row}: {value:?}")]
    MalformedDate { row: usize, value: String },

    /// A required column is absent from the export.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A money cell could not be read as a number.
    #[error("Invalid amount in column {column} on row {row}: {value:?}")]
    InvalidAmount {
        column: String,
        row: usize,
        value: String,
    },

    /// A caller-supplied date-range bound is not an ISO calendar date.
    #[error("Invalid date bound: {0}")]
    InvalidDateBound(String),

    /// An operation needed a loaded record set and none is present.
    #[error("No sales data loaded")]
    NoData,

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited-text reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or has no readable worksheet.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
