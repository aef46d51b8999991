//! Dashboard view model.
//!
//! Resolves user choices into [`FilterParameters`] and packages the filtered
//! series and per-county metrics into a [`DashboardView`] that a renderer can
//! draw without further computation.

use chrono::NaiveDate;
use serde::Serialize;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::formatting::format_amount;
use dashboard_core::models::{DeltaColor, FilterParameters, MetricResult, NormalizedRecord};
use dashboard_data::aggregator::{filter_and_aggregate, CountyAggregator};

/// Page title.
pub const TITLE: &str = "RA dashboard";

/// Warning shown when the selection is empty.
pub const EMPTY_SELECTION_WARNING: &str = "Select at least one county";

// ── View types ────────────────────────────────────────────────────────────────

/// One point on a county's time-series line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub amount: Option<f64>,
}

/// One line on the time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub county: String,
    pub points: Vec<ChartPoint>,
}

/// A rendered metric card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    /// e.g. `"Alpha RA"`.
    pub label: String,
    /// Amount at the end of the window, thousands-separated.
    pub value: String,
    /// Growth string, `"1.50x"` or `"n/a"`.
    pub delta: String,
    pub delta_color: DeltaColor,
}

impl From<&MetricResult> for MetricCard {
    fn from(metric: &MetricResult) -> Self {
        Self {
            label: format!("{} RA", metric.county),
            value: format_amount(metric.value_at_high),
            delta: metric.growth_label(),
            delta_color: metric.delta_color(),
        }
    }
}

/// Everything a presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub params: FilterParameters,
    /// Set when the user must be told something before the charts.
    pub warning: Option<String>,
    /// Chart lines, one per county with data in the window, sorted by county.
    pub chart: Vec<ChartLine>,
    /// Number of records behind the chart.
    pub series_len: usize,
    /// Heading for the metrics section, e.g. `"RA in 2021"`.
    pub metrics_heading: String,
    pub metrics: Vec<MetricResult>,
    pub cards: Vec<MetricCard>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Turn optional user choices into concrete parameters.
///
/// Missing years default to the table's year bounds and an empty county list
/// selects every county. Counties not present in the table are kept and
/// logged; they come out as n/a metrics.
pub fn resolve_parameters(
    records: &[NormalizedRecord],
    from_year: Option<i32>,
    to_year: Option<i32>,
    counties: &[String],
) -> Result<FilterParameters> {
    let bounds = CountyAggregator::year_bounds(records);
    let (low, high) = match (from_year, to_year, bounds) {
        (Some(low), Some(high), _) => (low, high),
        (low, high, Some((min, max))) => (low.unwrap_or(min), high.unwrap_or(max)),
        (_, _, None) => {
            return Err(DashboardError::Config(
                "dataset is empty; pass both --from-year and --to-year".to_string(),
            ))
        }
    };

    let selected = if counties.is_empty() {
        CountyAggregator::distinct_counties(records)
    } else {
        let known = CountyAggregator::distinct_counties(records);
        for county in counties.iter().filter(|c| !known.contains(*c)) {
            tracing::warn!(county = county.as_str(), "selected county not present in dataset");
        }
        counties.to_vec()
    };

    FilterParameters::new(low, high, selected)
}

/// Build the view for one set of parameters.
pub fn build_view(records: &[NormalizedRecord], params: &FilterParameters) -> DashboardView {
    let (series, metrics) = filter_and_aggregate(records, params);

    let warning = params
        .selected_counties
        .is_empty()
        .then(|| EMPTY_SELECTION_WARNING.to_string());

    let chart = series
        .by_county()
        .into_iter()
        .map(|(county, points)| ChartLine {
            county: county.to_string(),
            points: points
                .into_iter()
                .map(|(date, amount)| ChartPoint { date, amount })
                .collect(),
        })
        .collect();

    let cards = metrics.iter().map(MetricCard::from).collect();

    DashboardView {
        title: TITLE.to_string(),
        params: params.clone(),
        warning,
        chart,
        series_len: series.len(),
        metrics_heading: format!("RA in {}", params.year_high),
        metrics,
        cards,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
