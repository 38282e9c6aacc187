use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that can occur while the tool decodes a
/// gradebook export, builds reports, or writes the resulting workbook.
///
/// Score-level problems (malformed grades, empty cells, zero max points) are
/// never surfaced here; they are normalised in place.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    /// Errors bubbled up from the CSV reader.
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the source has no header row, no columns, or no data rows.
    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    /// Raised when a requested identity or attendance column is absent.
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    /// Raised when the settings snapshot violates its constraints.
    #[error("invalid settings: {0}")]
    InvalidConfig(String),

    /// Raised when the input file extension has no decoder.
    #[error("unsupported input format: {}", .0.display())]
    UnsupportedInput(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
