//! HTTP route handlers for the statistics API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::store::{StatsError, StatsStore};

/// Application state containing the statistics store
#[derive(Clone)]
pub struct StatsAppState {
    pub store: Arc<StatsStore>,
}

/// Error response for statistics API
#[derive(Debug, Serialize)]
pub struct StatsErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<StatsError> for StatsErrorResponse {
    fn from(e: StatsError) -> Self {
        let code = match &e {
            StatsError::NotFound(_) => "not_found",
            StatsError::ParseError { .. } => "parse_error",
            StatsError::IoError(_) => "io_error",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for StatsErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn log_failure(what: &str, e: &StatsError) {
    match e {
        StatsError::NotFound(_) => tracing::warn!("No {} available: {}", what, e),
        _ => tracing::error!("Failed to load {}: {}", what, e),
    }
}

/// GET /api/summary - Per-class summary statistics
pub async fn get_summary(
    State(state): State<StatsAppState>,
) -> Result<Json<Value>, StatsErrorResponse> {
    let summary = state.store.summary().await.map_err(|e| {
        log_failure("summary statistics", &e);
        StatsErrorResponse::from(e)
    })?;

    Ok(Json(summary))
}

/// GET /api/transition-matrix - Class transition matrix
pub async fn get_transition_matrix(
    State(state): State<StatsAppState>,
) -> Result<Json<Value>, StatsErrorResponse> {
    let matrix = state.store.transition_matrix().await.map_err(|e| {
        log_failure("transition matrix", &e);
        StatsErrorResponse::from(e)
    })?;

    Ok(Json(matrix))
}

/// Build statistics API routes
pub fn stats_routes(state: StatsAppState) -> Router {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/transition-matrix", get(get_transition_matrix))
        .with_state(state)
}
