//! Runtime layer for the RA dashboard.
//!
//! Memoizes loaded datasets per source file and turns filter parameters into
//! the view model a presentation layer renders.

pub mod data_manager;
pub mod view;

pub use dashboard_core as core;
pub use dashboard_data as data;
