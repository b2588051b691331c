//! Data layer for the Evergreen dashboard.
//!
//! Reads sales exports (CSV or spreadsheet, from disk or an upload payload)
//! into typed records, filters them by purchase date, builds monthly, annual
//! and per-client rollups, and runs the one-shot dashboard pipeline.

pub mod aggregator;
pub mod analysis;
pub mod charts;
pub mod filter;
pub mod loader;

pub use dashboard_core as core;
