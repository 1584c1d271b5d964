//! HTTP route handlers for the AOI mask API

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::mask::build_mask;
use super::types::{AoiFeature, MaskFeature};

/// Application state for AOI routes
#[derive(Clone, Default)]
pub struct AoiAppState {
    /// Mask of the AOI configured at startup
    pub configured_mask: Arc<Option<MaskFeature>>,
}

impl AoiAppState {
    pub fn from_feature(aoi: Option<&AoiFeature>) -> Self {
        Self {
            configured_mask: Arc::new(build_mask(aoi).map(|m| m.to_feature())),
        }
    }
}

/// Response for mask queries; `mask` is null when there is nothing to shade
#[derive(Debug, Serialize, Deserialize)]
pub struct MaskResponse {
    pub mask: Option<MaskFeature>,
}

/// GET /api/aoi/mask - Mask for the configured AOI
pub async fn get_configured_mask(State(state): State<AoiAppState>) -> Json<MaskResponse> {
    Json(MaskResponse {
        mask: (*state.configured_mask).clone(),
    })
}

/// POST /api/aoi/mask - Mask for an AOI supplied by the client
///
/// Always answers 200; anything that is not a usable boundary yields a null mask.
pub async fn build_mask_for(Json(body): Json<serde_json::Value>) -> Json<MaskResponse> {
    let mask = match AoiFeature::from_value(body) {
        Ok(aoi) => build_mask(aoi.as_ref()).map(|m| m.to_feature()),
        Err(e) => {
            warn!("Not masking AOI: {}", e);
            None
        }
    };
    debug!("AOI mask requested, produced: {}", mask.is_some());

    Json(MaskResponse { mask })
}

/// Build AOI API routes
pub fn aoi_routes(state: AoiAppState) -> Router {
    Router::new()
        .route("/aoi/mask", get(get_configured_mask).post(build_mask_for))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoi::types::AoiGeometry;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_handler_returns_mask_for_polygon() {
        let body = json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}
        });
        let Json(response) = build_mask_for(Json(body)).await;

        let mask = response.mask.expect("mask expected");
        assert_eq!(mask.geometry.coordinates.len(), 2);
        assert_eq!(mask.geometry.coordinates[1][1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_post_handler_tolerates_garbage() {
        for body in [json!(null), json!({}), json!(42), json!({"geometry": "x"})] {
            let Json(response) = build_mask_for(Json(body)).await;
            assert!(response.mask.is_none());
        }
    }

    #[tokio::test]
    async fn test_configured_mask_is_served() {
        let aoi = AoiFeature::with_geometry(AoiGeometry::new(
            "Polygon",
            json!([[[0, 0], [1, 0], [1, 1], [0, 0]]]),
        ));
        let state = AoiAppState::from_feature(Some(&aoi));

        let Json(response) = get_configured_mask(State(state)).await;
        assert!(response.mask.is_some());

        let Json(response) = get_configured_mask(State(AoiAppState::default())).await;
        assert!(response.mask.is_none());
    }
}
