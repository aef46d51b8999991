//! Filter and per-county aggregation over the normalized RA table.
//!
//! Everything here is a pure function of `(records, params)`: the source
//! table is only borrowed, results are freshly built, and nothing fails.
//! Data gaps degrade to missing values: a gap at the low year gives `"n/a"`
//! growth, a gap at the high year gives a NaN ratio.

use std::collections::{HashMap, HashSet};

use dashboard_core::models::{FilterParameters, FilteredSeries, MetricResult, NormalizedRecord};
use tracing::{debug, warn};

// ── PointValue ────────────────────────────────────────────────────────────────

/// Outcome of looking up a county's amount in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    /// A record exists and carries an amount.
    Amount(f64),
    /// A record exists but its amount is missing.
    Null,
    /// No record exists for the `(county, year)` pair.
    Gap,
}

impl PointValue {
    /// The amount, collapsing `Null` and `Gap` into `None`.
    pub fn amount(self) -> Option<f64> {
        match self {
            PointValue::Amount(v) => Some(v),
            PointValue::Null | PointValue::Gap => None,
        }
    }

    fn from_record(record: &NormalizedRecord) -> Self {
        record.amount.map_or(PointValue::Null, PointValue::Amount)
    }
}

// ── CountyAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that filters and summarizes records by county.
pub struct CountyAggregator;

impl CountyAggregator {
    /// Records whose county is selected and whose year lies in the inclusive
    /// range, in source order.
    pub fn filter(records: &[NormalizedRecord], params: &FilterParameters) -> FilteredSeries {
        if params.selected_counties.is_empty() {
            return FilteredSeries::default();
        }
        let selected: HashSet<&str> = params.selected_counties.iter().map(String::as_str).collect();
        FilteredSeries {
            records: records
                .iter()
                .filter(|r| params.contains_year(r.year) && selected.contains(r.county.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// One [`MetricResult`] per selected county, in selection order.
    ///
    /// The low and high values are the amounts of the first record (source
    /// order) for the county in `year_low` and `year_high` respectively.
    pub fn metrics(records: &[NormalizedRecord], params: &FilterParameters) -> Vec<MetricResult> {
        if params.selected_counties.is_empty() {
            return Vec::new();
        }
        let index = PointIndex::build(records, params);

        params
            .selected_counties
            .iter()
            .map(|county| {
                let low = index.get(county, params.year_low);
                let high = index.get(county, params.year_high);
                if low == PointValue::Gap || high == PointValue::Gap {
                    debug!(
                        county = county.as_str(),
                        low = ?low,
                        high = ?high,
                        "no record at one end of the window"
                    );
                }
                MetricResult::new(county.clone(), low.amount(), high.amount())
            })
            .collect()
    }

    /// The first amount for `(county, year)`, scanning in source order.
    pub fn lookup(records: &[NormalizedRecord], county: &str, year: i32) -> PointValue {
        records
            .iter()
            .find(|r| r.year == year && r.county == county)
            .map_or(PointValue::Gap, PointValue::from_record)
    }

    /// Distinct counties in order of first appearance.
    pub fn distinct_counties(records: &[NormalizedRecord]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        records
            .iter()
            .filter(|r| seen.insert(r.county.as_str()))
            .map(|r| r.county.clone())
            .collect()
    }

    /// Earliest and latest year present, or `None` for an empty table.
    pub fn year_bounds(records: &[NormalizedRecord]) -> Option<(i32, i32)> {
        let min = records.iter().map(|r| r.year).min()?;
        let max = records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// The full observed year range with every county selected.
    pub fn default_parameters(records: &[NormalizedRecord]) -> Option<FilterParameters> {
        let (low, high) = Self::year_bounds(records)?;
        Some(FilterParameters {
            year_low: low,
            year_high: high,
            selected_counties: Self::distinct_counties(records),
        })
    }
}

/// Filter `records` and compute per-county metrics in one call.
///
/// An empty selection yields an empty series and no metrics; surfacing a
/// warning is left to the caller.
pub fn filter_and_aggregate(
    records: &[NormalizedRecord],
    params: &FilterParameters,
) -> (FilteredSeries, Vec<MetricResult>) {
    if params.selected_counties.is_empty() {
        warn!("no counties selected");
        return (FilteredSeries::default(), Vec::new());
    }

    let series = CountyAggregator::filter(records, params);
    let metrics = CountyAggregator::metrics(records, params);

    debug!(
        year_low = params.year_low,
        year_high = params.year_high,
        counties = params.selected_counties.len(),
        series_len = series.len(),
        "filtered and aggregated"
    );

    (series, metrics)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// First-match lookup table for the two window endpoints, built in one pass.
struct PointIndex<'a> {
    points: HashMap<(&'a str, i32), PointValue>,
}

impl<'a> PointIndex<'a> {
    fn build(records: &'a [NormalizedRecord], params: &FilterParameters) -> Self {
        let selected: HashSet<&str> = params.selected_counties.iter().map(String::as_str).collect();
        let mut points: HashMap<(&'a str, i32), PointValue> = HashMap::new();
        let mut duplicates = 0usize;

        for record in records {
            if record.year != params.year_low && record.year != params.year_high {
                continue;
            }
            if !selected.contains(record.county.as_str()) {
                continue;
            }
            let key = (record.county.as_str(), record.year);
            if points.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            points.insert(key, PointValue::from_record(record));
        }

        if duplicates > 0 {
            debug!(duplicates, "repeated (county, year) records; first match kept");
        }

        Self { points }
    }

    fn get(&self, county: &str, year: i32) -> PointValue {
        self.points
            .get(&(county, year))
            .copied()
            .unwrap_or(PointValue::Gap)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{DeltaColor, Growth};

    fn rec(county: &str, y: i32, m: u32, amount: Option<f64>) -> NormalizedRecord {
        NormalizedRecord::new(
            format!("{county}-{y}-{m}"),
            county,
            NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            amount,
        )
    }

    fn params(low: i32, high: i32, counties: &[&str]) -> FilterParameters {
        FilterParameters::new(low, high, counties.iter().copied()).unwrap()
    }

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            rec("A", 2019, 6, Some(80.0)),
            rec("A", 2020, 1, Some(100.0)),
            rec("B", 2020, 1, Some(10.0)),
            rec("A", 2021, 1, Some(150.0)),
            rec("B", 2021, 1, None),
            rec("C", 2021, 1, Some(7.0)),
            rec("A", 2022, 1, Some(300.0)),
        ]
    }

    fn naive_filter(records: &[NormalizedRecord], p: &FilterParameters) -> Vec<NormalizedRecord> {
        let mut out = Vec::new();
        for r in records {
            let selected = p.selected_counties.contains(&r.county);
            if selected && p.year_low <= r.year && r.year <= p.year_high {
                out.push(r.clone());
            }
        }
        out
    }

    // ── filter_and_aggregate ──────────────────────────────────────────────────

    #[test]
    fn test_two_year_example() {
        let records = vec![rec("A", 2020, 1, Some(100.0)), rec("A", 2021, 1, Some(150.0))];
        let (series, metrics) = filter_and_aggregate(&records, &params(2020, 2021, &["A"]));

        assert_eq!(series.records, records);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].county, "A");
        assert_eq!(metrics[0].value_at_low, Some(100.0));
        assert_eq!(metrics[0].value_at_high, Some(150.0));
        assert_eq!(metrics[0].growth_label(), "1.50x");
        assert_eq!(metrics[0].delta_color(), DeltaColor::Normal);
    }

    #[test]
    fn test_low_year_without_record_is_na() {
        let records = vec![rec("A", 2020, 1, Some(100.0)), rec("A", 2021, 1, Some(150.0))];
        let (series, metrics) = filter_and_aggregate(&records, &params(2019, 2021, &["A"]));

        assert_eq!(series.len(), 2);
        assert_eq!(metrics[0].value_at_low, None);
        assert_eq!(metrics[0].value_at_high, Some(150.0));
        assert_eq!(metrics[0].growth, Growth::NotAvailable);
        assert_eq!(metrics[0].growth_label(), "n/a");
        assert_eq!(metrics[0].delta_color(), DeltaColor::Off);
    }

    #[test]
    fn test_empty_selection() {
        let (series, metrics) = filter_and_aggregate(&sample(), &params(2019, 2022, &[]));
        assert!(series.is_empty());
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_filter_matches_naive_reference() {
        let records = sample();
        let cases = [
            params(2019, 2022, &["A", "B", "C"]),
            params(2020, 2021, &["A"]),
            params(2021, 2021, &["B", "C"]),
            params(2023, 2030, &["A"]),
            params(2020, 2022, &["Z"]),
        ];
        for p in &cases {
            let series = CountyAggregator::filter(&records, p);
            assert_eq!(series.records, naive_filter(&records, p), "params: {p:?}");
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let records = sample();
        let series = CountyAggregator::filter(&records, &params(2020, 2021, &["A"]));
        let years: Vec<i32> = series.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2021]);
    }

    #[test]
    fn test_full_range_round_trip() {
        let records = sample();
        let p = CountyAggregator::default_parameters(&records).unwrap();
        let (series, metrics) = filter_and_aggregate(&records, &p);
        assert_eq!(series.records, records);
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_deterministic() {
        let records = sample();
        let p = params(2020, 2021, &["B", "A"]);
        let first = filter_and_aggregate(&records, &p);
        let second = filter_and_aggregate(&records, &p);
        // B's growth is NaN, which never compares equal to itself.
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn test_source_not_mutated() {
        let records = sample();
        let before = records.clone();
        let _ = filter_and_aggregate(&records, &params(2020, 2021, &["A"]));
        assert_eq!(records, before);
    }

    // ── metrics ───────────────────────────────────────────────────────────────

    #[test]
    fn test_metrics_follow_selection_order() {
        let metrics = CountyAggregator::metrics(&sample(), &params(2020, 2021, &["C", "A", "B"]));
        let counties: Vec<&str> = metrics.iter().map(|m| m.county.as_str()).collect();
        assert_eq!(counties, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_metrics_null_high_amount_formats_nan() {
        let metrics = CountyAggregator::metrics(&sample(), &params(2020, 2021, &["B"]));
        assert_eq!(metrics[0].value_at_low, Some(10.0));
        assert_eq!(metrics[0].value_at_high, None);
        assert!(matches!(metrics[0].growth, Growth::Ratio(r) if r.is_nan()));
        assert_eq!(metrics[0].growth_label(), "NaNx");
        assert_eq!(metrics[0].delta_color(), DeltaColor::Normal);
    }

    #[test]
    fn test_metrics_missing_high_year_formats_nan() {
        let records = vec![rec("A", 2020, 1, Some(40.0))];
        let metrics = CountyAggregator::metrics(&records, &params(2020, 2021, &["A"]));
        assert_eq!(metrics[0].value_at_high, None);
        assert_eq!(metrics[0].growth_label(), "NaNx");
    }

    #[test]
    fn test_metrics_zero_low_amount_is_na() {
        let records = vec![rec("A", 2020, 1, Some(0.0)), rec("A", 2021, 1, Some(50.0))];
        let metrics = CountyAggregator::metrics(&records, &params(2020, 2021, &["A"]));
        assert_eq!(metrics[0].value_at_low, Some(0.0));
        assert_eq!(metrics[0].growth_label(), "n/a");
        assert_eq!(metrics[0].delta_color(), DeltaColor::Off);
    }

    #[test]
    fn test_metrics_nan_low_amount_is_na() {
        let records = vec![rec("A", 2020, 1, Some(f64::NAN)), rec("A", 2021, 1, Some(50.0))];
        let metrics = CountyAggregator::metrics(&records, &params(2020, 2021, &["A"]));
        assert_eq!(metrics[0].growth, Growth::NotAvailable);
    }

    #[test]
    fn test_metrics_duplicate_year_uses_first_match() {
        let records = vec![
            rec("A", 2020, 3, Some(40.0)),
            rec("A", 2020, 1, Some(20.0)),
            rec("A", 2022, 1, Some(100.0)),
        ];
        let metrics = CountyAggregator::metrics(&records, &params(2020, 2022, &["A"]));
        assert_eq!(metrics[0].value_at_low, Some(40.0));
        assert_eq!(metrics[0].growth_label(), "2.50x");
    }

    #[test]
    fn test_metrics_unknown_county_degrades() {
        let metrics = CountyAggregator::metrics(&sample(), &params(2020, 2021, &["A", "Nowhere"]));
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].growth_label(), "1.50x");
        assert_eq!(metrics[1].value_at_low, None);
        assert_eq!(metrics[1].value_at_high, None);
        assert_eq!(metrics[1].growth_label(), "n/a");
    }

    #[test]
    fn test_metrics_single_year_window() {
        let metrics = CountyAggregator::metrics(&sample(), &params(2021, 2021, &["A"]));
        assert_eq!(metrics[0].value_at_low, Some(150.0));
        assert_eq!(metrics[0].value_at_high, Some(150.0));
        assert_eq!(metrics[0].growth_label(), "1.00x");
    }

    #[test]
    fn test_metrics_agree_with_lookup() {
        let records = sample();
        let p = params(2019, 2022, &["A", "B", "C"]);
        for m in CountyAggregator::metrics(&records, &p) {
            let low = CountyAggregator::lookup(&records, &m.county, 2019);
            let high = CountyAggregator::lookup(&records, &m.county, 2022);
            assert_eq!(m.value_at_low, low.amount());
            assert_eq!(m.value_at_high, high.amount());
        }
    }

    // ── lookup ────────────────────────────────────────────────────────────────

    #[test]
    fn test_lookup_distinguishes_gap_from_null() {
        let records = sample();
        assert_eq!(CountyAggregator::lookup(&records, "A", 2020), PointValue::Amount(100.0));
        assert_eq!(CountyAggregator::lookup(&records, "B", 2021), PointValue::Null);
        assert_eq!(CountyAggregator::lookup(&records, "B", 2019), PointValue::Gap);
        assert_eq!(PointValue::Null.amount(), PointValue::Gap.amount());
    }

    // ── table summaries ───────────────────────────────────────────────────────

    #[test]
    fn test_distinct_counties_first_appearance_order() {
        assert_eq!(CountyAggregator::distinct_counties(&sample()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(CountyAggregator::year_bounds(&sample()), Some((2019, 2022)));
        assert_eq!(CountyAggregator::year_bounds(&[]), None);
    }

    #[test]
    fn test_default_parameters_empty_table() {
        assert!(CountyAggregator::default_parameters(&[]).is_none());
    }
}
