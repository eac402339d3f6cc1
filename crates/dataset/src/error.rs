use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: {0} (expected .xlsx, .xls, .xlsm, .ods or .csv)")]
    UnsupportedFormat(PathBuf),

    #[error("Missing required column(s) in {path}: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Both '{first}' and '{second}' are present in {path}; cannot tell which quantity convention applies")]
    AmbiguousProfile {
        path: PathBuf,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid value '{value}' in column '{column}' at row {row} of {path}: {reason}")]
    InvalidCell {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("No data rows in {0}")]
    Empty(PathBuf),

    #[error("Worksheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
