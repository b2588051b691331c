//! Terminal UI layer for the Evergreen dashboard.
//!
//! Provides themes, the header and KPI tile components, chart and table
//! views, and the main application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
