//! Precomputed land-cover statistics
//!
//! The classification pipeline writes class summaries and the 2018 -> 2023 transition matrix
//! as JSON. This module serves them unchanged to the dashboard.

pub mod routes;
mod store;

pub use routes::{StatsAppState, stats_routes};
pub use store::{StatsError, StatsStore, SUMMARY_FILE, TRANSITION_MATRIX_FILE};
