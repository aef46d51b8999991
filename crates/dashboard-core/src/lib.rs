//! Core types for the RA dashboard.
//!
//! Holds the normalized record and filter models, the error taxonomy shared
//! by every crate in the workspace, number and growth formatting, calendar
//! date parsing and the command-line settings layer.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
