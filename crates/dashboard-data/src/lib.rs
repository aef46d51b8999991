//! Data layer for the RA dashboard.
//!
//! Reads the RA and GDP CSV files into tidy in-memory tables and runs the
//! filter and per-county aggregation that feeds the chart and metric cards.

pub mod aggregator;
pub mod gdp;
pub mod reader;

pub use aggregator::filter_and_aggregate;
pub use dashboard_core as core;
pub use reader::normalize;
