//! Legacy GDP dataset: wide-to-long pivot.
//!
//! The source has one row per country with one column per year. The pivot
//! emits one [`GdpRecord`] per `(country, year)` for every year column in
//! `[MIN_YEAR, MAX_YEAR]` present in the header. Output is year-major: all
//! countries for the first year, then all countries for the next.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::GdpRecord;
use tracing::debug;

use crate::reader::{column_index, csv_error, line_of, parse_amount};

pub const COLUMN_COUNTRY_CODE: &str = "Country Code";
pub const MIN_YEAR: i32 = 1960;
pub const MAX_YEAR: i32 = 2022;

/// Load the GDP CSV at `path` and pivot it into long format.
pub fn pivot_gdp(path: &Path) -> Result<Vec<GdpRecord>> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    pivot_gdp_reader(file, path)
}

/// Same as [`pivot_gdp`] over any reader. `source` is only used in errors.
pub fn pivot_gdp_reader<R: Read>(reader: R, source: &Path) -> Result<Vec<GdpRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error(source, e))?.clone();
    let code_idx = column_index(&headers, COLUMN_COUNTRY_CODE, source)?;

    let year_columns: Vec<(i32, usize)> = (MIN_YEAR..=MAX_YEAR)
        .filter_map(|year| {
            let idx = column_index(&headers, &year.to_string(), source).ok();
            if idx.is_none() {
                debug!(year, "GDP year column absent; skipping");
            }
            idx.map(|i| (year, i))
        })
        .collect();

    // Parse every row before emitting so a bad cell fails the whole pivot.
    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| csv_error(source, e))?;
        let line = line_of(&row);
        let values = year_columns
            .iter()
            .map(|&(_, idx)| parse_amount(row.get(idx).unwrap_or_default(), line))
            .collect::<Result<Vec<_>>>()?;
        rows.push((row.get(code_idx).unwrap_or_default().to_string(), values));
    }

    let mut records = Vec::with_capacity(rows.len() * year_columns.len());
    for (slot, &(year, _)) in year_columns.iter().enumerate() {
        for (code, values) in &rows {
            records.push(GdpRecord {
                country_code: code.clone(),
                year,
                value: values[slot],
            });
        }
    }

    debug!(
        countries = rows.len(),
        years = year_columns.len(),
        records = records.len(),
        "pivoted GDP dataset"
    );

    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pivot(content: &str) -> Result<Vec<GdpRecord>> {
        pivot_gdp_reader(Cursor::new(content.to_string()), Path::new("gdp.csv"))
    }

    fn gdp(code: &str, year: i32, value: Option<f64>) -> GdpRecord {
        GdpRecord {
            country_code: code.to_string(),
            year,
            value,
        }
    }

    #[test]
    fn test_pivot_year_major_order() {
        let records = pivot(
            "Country Name,Country Code,Indicator,1960,1961\n\
             Aruba,ABW,GDP,1.5,2.5\n\
             Chad,TCD,GDP,3,\n",
        )
        .unwrap();

        assert_eq!(
            records,
            vec![
                gdp("ABW", 1960, Some(1.5)),
                gdp("TCD", 1960, Some(3.0)),
                gdp("ABW", 1961, Some(2.5)),
                gdp("TCD", 1961, None),
            ]
        );
    }

    #[test]
    fn test_pivot_ignores_years_outside_range() {
        let records = pivot("Country Code,1959,2022,2023\nABW,1,2,3\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2022);
        assert_eq!(records[0].value, Some(2.0));
    }

    #[test]
    fn test_pivot_full_range_count() {
        let years: Vec<String> = (MIN_YEAR..=MAX_YEAR).map(|y| y.to_string()).collect();
        let values: Vec<&str> = years.iter().map(|_| "1").collect();
        let content = format!(
            "Country Code,{}\nABW,{}\nTCD,{}\n",
            years.join(","),
            values.join(","),
            values.join(",")
        );

        let records = pivot(&content).unwrap();
        assert_eq!(records.len(), 2 * 63);
        assert!(records.iter().all(|r| (MIN_YEAR..=MAX_YEAR).contains(&r.year)));
    }

    #[test]
    fn test_pivot_no_year_columns() {
        assert!(pivot("Country Code,Country Name\nABW,Aruba\n").unwrap().is_empty());
    }

    #[test]
    fn test_pivot_missing_country_code() {
        let err = pivot("Country Name,1960\nAruba,1\n").unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { .. }));
    }

    #[test]
    fn test_pivot_non_numeric_value_fails() {
        let err = pivot("Country Code,1960\nABW,abc\n").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_pivot_missing_file() {
        let err = pivot_gdp(Path::new("/tmp/does-not-exist-gdp-xyz.csv")).unwrap_err();
        assert!(err.is_io_error());
    }
}
