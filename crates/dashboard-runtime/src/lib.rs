//! Runtime layer for the Evergreen dashboard.
//!
//! Owns the session context: the currently loaded record set, replaced
//! wholesale on upload, and the selected date window.

pub mod session;

pub use dashboard_core as core;
pub use dashboard_data as data;
