use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{DashboardError, Result};
use crate::formatting::format_growth;

/// One case-level assistance payment after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Case identifier as found in the source file.
    pub case_id: String,
    /// County of residence; the grouping key for filters and charts.
    pub county: String,
    /// Calendar date of the payment.
    pub date: NaiveDate,
    /// Calendar year of `date`.
    pub year: i32,
    /// Payment amount. `None` when the source cell was empty or NA.
    pub amount: Option<f64>,
}

impl NormalizedRecord {
    /// Build a record, deriving `year` from `date`.
    pub fn new(
        case_id: impl Into<String>,
        county: impl Into<String>,
        date: NaiveDate,
        amount: Option<f64>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            county: county.into(),
            date,
            year: date.year(),
            amount,
        }
    }
}

/// One `(country, year)` observation produced by the GDP pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpRecord {
    pub country_code: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// User-chosen filter state, rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Inclusive lower year bound.
    pub year_low: i32,
    /// Inclusive upper year bound.
    pub year_high: i32,
    /// Selected counties, in selection order, without duplicates.
    pub selected_counties: Vec<String>,
}

impl FilterParameters {
    /// Validate the year range and drop repeated counties, keeping the first
    /// occurrence of each.
    pub fn new<I, S>(year_low: i32, year_high: i32, counties: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if year_low > year_high {
            return Err(DashboardError::InvalidYearRange {
                low: year_low,
                high: year_high,
            });
        }

        let mut seen: HashSet<String> = HashSet::new();
        let selected_counties = counties
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| seen.insert(c.clone()))
            .collect();

        Ok(Self {
            year_low,
            year_high,
            selected_counties,
        })
    }

    /// `true` when `year` lies inside the inclusive range.
    pub fn contains_year(&self, year: i32) -> bool {
        self.year_low <= year && year <= self.year_high
    }

    /// `true` when `county` is one of the selected counties.
    pub fn is_selected(&self, county: &str) -> bool {
        self.selected_counties.iter().any(|c| c == county)
    }

    /// `true` when a record passes both the county and the year filter.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.contains_year(record.year) && self.is_selected(&record.county)
    }
}

/// Records that passed the filter, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredSeries {
    pub records: Vec<NormalizedRecord>,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter()
    }

    /// Group the series per county as date-ordered `(date, amount)` points,
    /// one line per county on a time-series chart.
    ///
    /// Points sharing a date keep their source order.
    pub fn by_county(&self) -> BTreeMap<&str, Vec<(NaiveDate, Option<f64>)>> {
        let mut lines: BTreeMap<&str, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
        for record in &self.records {
            lines
                .entry(record.county.as_str())
                .or_default()
                .push((record.date, record.amount));
        }
        for points in lines.values_mut() {
            points.sort_by_key(|(date, _)| *date);
        }
        lines
    }
}

/// Start-to-end growth multiple for one county.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// `value_at_high / value_at_low`.
    Ratio(f64),
    /// No meaningful ratio exists for the window.
    NotAvailable,
}

impl Growth {
    /// Compute the growth multiple between two point values.
    ///
    /// `NotAvailable` when the low value is missing, NaN or zero. Otherwise
    /// `high / low`, with a missing high value taken as NaN.
    pub fn between(low: Option<f64>, high: Option<f64>) -> Self {
        match low {
            Some(low) if !low.is_nan() && low != 0.0 => {
                Growth::Ratio(high.unwrap_or(f64::NAN) / low)
            }
            _ => Growth::NotAvailable,
        }
    }

    /// `true` when the delta carries a meaningful severity.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Growth::Ratio(_))
    }

    pub fn delta_color(&self) -> DeltaColor {
        if self.is_actionable() {
            DeltaColor::Normal
        } else {
            DeltaColor::Off
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Ratio(ratio) => f.write_str(&format_growth(*ratio)),
            Growth::NotAvailable => f.write_str("n/a"),
        }
    }
}

/// How a presentation layer should color a metric delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaColor {
    /// Actionable: color by sign.
    Normal,
    /// Neutral: no color or severity.
    Off,
}

/// Point values and growth for one selected county.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub county: String,
    /// Amount at `year_low`, `None` when no record or no amount exists.
    pub value_at_low: Option<f64>,
    /// Amount at `year_high`, `None` when no record or no amount exists.
    pub value_at_high: Option<f64>,
    pub growth: Growth,
}

impl MetricResult {
    pub fn new(
        county: impl Into<String>,
        value_at_low: Option<f64>,
        value_at_high: Option<f64>,
    ) -> Self {
        Self {
            county: county.into(),
            value_at_low,
            value_at_high,
            growth: Growth::between(value_at_low, value_at_high),
        }
    }

    /// Growth rendered as `"1.50x"` or `"n/a"`.
    pub fn growth_label(&self) -> String {
        self.growth.to_string()
    }

    pub fn delta_color(&self) -> DeltaColor {
        self.growth.delta_color()
    }
}
