//! RA dataset ingestion.
//!
//! Reads the case-level payments CSV, keeps the case id, county, date and
//! amount columns, and types each row into a [`NormalizedRecord`]. Any bad
//! row fails the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use csv::StringRecord;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::NormalizedRecord;
use dashboard_core::time_utils::parse_calendar_date;
use tracing::debug;

pub const COLUMN_CASE_ID: &str = "Case Id";
pub const COLUMN_COUNTY: &str = "ApplicantInfo_CountyResidence";
pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_AMOUNT: &str = "Amount";

/// Cell spellings read as a missing value.
const MISSING_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and normalize the RA CSV at `path`.
///
/// Output keeps source row order. Fails with [`DashboardError::FileRead`]
/// when the file cannot be opened, and with a parse error when the content
/// is not CSV, a required column is missing, or any row carries a malformed
/// date or amount.
pub fn normalize(path: &Path) -> Result<Vec<NormalizedRecord>> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    normalize_reader(file, path)
}

/// Same as [`normalize`] over any reader. `source` is only used in errors.
pub fn normalize_reader<R: Read>(reader: R, source: &Path) -> Result<Vec<NormalizedRecord>> {
    let started = Instant::now();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error(source, e))?.clone();
    let case_idx = column_index(&headers, COLUMN_CASE_ID, source)?;
    let county_idx = column_index(&headers, COLUMN_COUNTY, source)?;
    let date_idx = column_index(&headers, COLUMN_DATE, source)?;
    let amount_idx = column_index(&headers, COLUMN_AMOUNT, source)?;

    let mut records: Vec<NormalizedRecord> = Vec::new();
    let mut missing_amounts = 0usize;

    for row in rdr.records() {
        let row = row.map_err(|e| csv_error(source, e))?;
        let line = line_of(&row);

        let date_cell = row.get(date_idx).unwrap_or_default();
        let date = parse_calendar_date(date_cell).ok_or_else(|| DashboardError::DateParse {
            line,
            value: date_cell.to_string(),
        })?;

        let amount = parse_amount(row.get(amount_idx).unwrap_or_default(), line)?;
        if amount.is_none() {
            missing_amounts += 1;
        }

        records.push(NormalizedRecord::new(
            row.get(case_idx).unwrap_or_default(),
            row.get(county_idx).unwrap_or_default(),
            date,
            amount,
        ));
    }

    debug!(
        path = %source.display(),
        rows = records.len(),
        missing_amounts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "normalized RA dataset"
    );

    Ok(records)
}

// ── Crate helpers ─────────────────────────────────────────────────────────────

/// Parse a numeric cell. Empty cells and [`MISSING_TOKENS`] are `None`.
pub(crate) fn parse_amount(cell: &str, line: u64) -> Result<Option<f64>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| DashboardError::AmountParse {
            line,
            value: cell.to_string(),
        })
}

/// Position of `name` in the header row, ignoring surrounding whitespace and
/// a leading byte-order mark.
pub(crate) fn column_index(headers: &StringRecord, name: &str, source: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| DashboardError::MissingColumn {
            path: source.to_path_buf(),
            column: name.to_string(),
        })
}

pub(crate) fn csv_error(source: &Path, e: csv::Error) -> DashboardError {
    DashboardError::Csv {
        path: source.to_path_buf(),
        source: e,
    }
}

/// 1-based source line of a record, counting the header.
pub(crate) fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
