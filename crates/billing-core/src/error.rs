use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the billing dashboard crates.
#[derive(Error, Debug)]
pub enum BillingError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A numeric field held text that is not a finite decimal number.
    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A record with both energy line items lacks another required item.
    #[error("Invoice dated {date:?} is missing {field}")]
    MissingField { field: &'static str, date: String },

    /// Summing a record's figures (or the running totals) left the finite range.
    #[error("Invoice dated {date:?} overflows {field}")]
    Overflow { field: &'static str, date: String },

    /// The configured invoice listing does not exist.
    #[error("Invoice source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A source directory contained no `.json` listing files.
    #[error("No JSON invoice files found in {0}")]
    NoInvoiceFiles(PathBuf),

    /// Every `.json` file in a source directory failed to load.
    #[error("None of the {files} JSON files in {dir} could be loaded")]
    NoReadableInvoiceFiles { dir: PathBuf, files: usize },

    /// A download key that is empty or escapes the invoice directory.
    #[error("Invalid invoice file name: {0:?}")]
    InvalidFileName(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the billing crates.
pub type Result<T> = std::result::Result<T, BillingError>;
