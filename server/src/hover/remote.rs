//! HTTP pixel lookup against the raster classification backend

use async_trait::async_trait;
use metrics::histogram;
use std::time::Instant;
use tracing::debug;

use super::service::PixelLookup;
use super::types::{LookupError, PixelResult};
use crate::config::PixelServiceConfig;

/// `PixelLookup` backed by `GET {base_url}/api/pixel?lat=..&lon=..`
#[derive(Debug, Clone)]
pub struct HttpPixelLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPixelLookup {
    pub fn new(config: &PixelServiceConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/pixel", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if let Some(status) = e.status() {
            LookupError::Status(status.as_u16())
        } else if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl PixelLookup for HttpPixelLookup {
    async fn query_pixel(&self, lat: f64, lon: f64) -> Result<PixelResult, LookupError> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("lat", lat), ("lon", lon)])
            .send()
            .await?
            .error_for_status()?;
        let result = response.json::<PixelResult>().await?;

        histogram!("landcover_pixel_lookup_duration_seconds").record(start.elapsed());
        debug!(
            "Pixel ({:.5}, {:.5}) classified in {:?}",
            lat,
            lon,
            start.elapsed()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = PixelServiceConfig {
            base_url: "http://pixels.local:9000/".to_string(),
            request_timeout: Duration::from_millis(500),
        };
        let lookup = HttpPixelLookup::new(&config).unwrap();
        assert_eq!(lookup.endpoint(), "http://pixels.local:9000/api/pixel");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_transport_error() {
        let config = PixelServiceConfig {
            // Port 1 on loopback refuses connections
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout: Duration::from_millis(500),
        };
        let lookup = HttpPixelLookup::new(&config).unwrap();

        let err = lookup.query_pixel(13.6, 79.4).await.unwrap_err();
        assert!(
            matches!(err, LookupError::Transport(_) | LookupError::Timeout),
            "unexpected error: {:?}",
            err
        );
        assert!(!lookup.is_reachable().await);
    }
}
