//! Plain-text and JSON rendering of a [`DashboardView`].

use std::fmt::Write;

use dashboard_core::formatting::format_number;
use dashboard_core::models::{DeltaColor, GdpRecord};
use dashboard_runtime::view::DashboardView;
use serde::Serialize;

/// Counts describing a pivoted GDP table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GdpSummary {
    pub countries: usize,
    pub observations: usize,
    pub with_value: usize,
    pub year_bounds: Option<(i32, i32)>,
}

impl GdpSummary {
    pub fn from_records(records: &[GdpRecord]) -> Self {
        let mut countries: Vec<&str> = records.iter().map(|r| r.country_code.as_str()).collect();
        countries.sort_unstable();
        countries.dedup();

        let min = records.iter().map(|r| r.year).min();
        let max = records.iter().map(|r| r.year).max();

        Self {
            countries: countries.len(),
            observations: records.len(),
            with_value: records.iter().filter(|r| r.value.is_some()).count(),
            year_bounds: min.zip(max),
        }
    }
}

/// Top-level JSON document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub view: &'a DashboardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdp: Option<&'a GdpSummary>,
}

/// Render the view as a plain-text report.
pub fn render_text(view: &DashboardView, gdp: Option<&GdpSummary>) -> String {
    let mut out = String::new();
    let params = &view.params;

    let _ = writeln!(out, "# {}", view.title);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Years {}-{}, {} counties selected",
        params.year_low,
        params.year_high,
        params.selected_counties.len()
    );

    if let Some(warning) = &view.warning {
        let _ = writeln!(out);
        let _ = writeln!(out, "WARNING: {}", warning);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## RA over time ({} records)", view.series_len);
    for line in &view.chart {
        let total: f64 = line.points.iter().filter_map(|p| p.amount).sum();
        let (first, last) = match (line.points.first(), line.points.last()) {
            (Some(f), Some(l)) => (f.date.to_string(), l.date.to_string()),
            _ => continue,
        };
        let _ = writeln!(
            out,
            "{:<24} {:>6} points  {} -> {}  total {}",
            line.county,
            line.points.len(),
            first,
            last,
            format_number(total, 0)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## {}", view.metrics_heading);
    for card in &view.cards {
        let marker = match card.delta_color {
            DeltaColor::Normal => "",
            DeltaColor::Off => " (neutral)",
        };
        let _ = writeln!(
            out,
            "{:<28} {:>14}  {}{}",
            card.label, card.value, card.delta, marker
        );
    }

    if let Some(gdp) = gdp {
        let _ = writeln!(out);
        let _ = writeln!(out, "## GDP dataset");
        let years = gdp
            .year_bounds
            .map(|(lo, hi)| format!("{}-{}", lo, hi))
            .unwrap_or_else(|| "none".to_string());
        let _ = writeln!(
            out,
            "{} countries, {} observations ({} with values), years {}",
            gdp.countries, gdp.observations, gdp.with_value, years
        );
    }

    out
}
