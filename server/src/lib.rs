//! Land-cover dashboard server library
//!
//! This module exports the server components for use in integration tests
//! and external tooling.

pub mod aoi;
pub mod config;
pub mod hover;
pub mod protocol;
pub mod server;
pub mod stats;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use aoi::{AoiAppState, aoi_routes, build_mask};
pub use hover::{HoverQueryController, HoverSession, HttpPixelLookup, PixelLookup};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::AppState;
pub use stats::{StatsAppState, StatsStore, stats_routes};
