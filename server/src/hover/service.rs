//! PixelLookup trait definition

use async_trait::async_trait;

use super::types::{LookupError, PixelResult};

/// Remote pixel classification lookup
///
/// Calls are idempotent and may resolve in any order; callers decide which outcome still
/// matters.
#[async_trait]
pub trait PixelLookup: Send + Sync {
    /// Classify the pixel under a WGS84 position for both periods
    async fn query_pixel(&self, lat: f64, lon: f64) -> Result<PixelResult, LookupError>;

    /// Check whether the service answers at all
    async fn is_reachable(&self) -> bool {
        self.query_pixel(0.0, 0.0).await.is_ok()
    }
}
