//! Domain types and shared plumbing for the Evergreen dashboard.
//!
//! Holds the typed sales [`models`], the crate-wide [`error`] enum, CLI
//! [`settings`], calendar helpers and number formatting.

pub mod calendar;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
