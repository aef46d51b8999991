use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the RA dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file is not valid tabular (CSV) data.
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required header column is absent from the source file.
    #[error("Missing column \"{column}\" in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A date cell did not match any recognised calendar date format.
    #[error("Invalid date on line {line}: \"{value}\"")]
    DateParse { line: u64, value: String },

    /// An amount cell is neither empty nor numeric.
    #[error("Invalid amount on line {line}: \"{value}\"")]
    AmountParse { line: u64, value: String },

    /// Filter parameters were built with a low year above the high year.
    #[error("Invalid year range: {low} > {high}")]
    InvalidYearRange { low: i32, high: i32 },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// `true` for errors caused by content that is not valid tabular data.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Csv { .. }
                | DashboardError::MissingColumn { .. }
                | DashboardError::DateParse { .. }
                | DashboardError::AmountParse { .. }
        )
    }

    /// `true` for errors caused by a missing or unreadable file.
    pub fn is_io_error(&self) -> bool {
        match self {
            DashboardError::FileRead { .. } => true,
            DashboardError::Csv { source, .. } => source.is_io_error(),
            _ => false,
        }
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
