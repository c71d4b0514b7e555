//! Error types for universe operations.

use thiserror::Error;

/// Result type for universe operations.
pub type Result<T> = std::result::Result<T, UniverseError>;

/// Errors that can occur while importing, loading, saving or querying a
/// universe.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// The identifier column could not be resolved in imported data
    #[error("Id column error: {0}")]
    IdColumnError(String),

    /// File extension is not a supported storage format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Save was requested but the universe has no filename
    #[error("Universe has no filename associated with it")]
    UniverseFilenameNotSet,

    /// Ticker lookup failed on a non-empty universe
    #[error("Ticker symbol not found: {0}")]
    TickerSymbolNotFound(String),

    /// A row does not match the header width
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        /// Zero-based data row index
        row: usize,
        /// Number of columns in the header
        expected: usize,
        /// Number of values in the row
        found: usize,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet read error
    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    /// Spreadsheet write error
    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Market data error
    #[error("Market data error: {0}")]
    Data(#[from] equities_data::DataError),
}

impl From<calamine::XlsxError> for UniverseError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::SpreadsheetRead(err.into())
    }
}

impl From<calamine::XlsError> for UniverseError {
    fn from(err: calamine::XlsError) -> Self {
        Self::SpreadsheetRead(err.into())
    }
}
