//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use landcover_server::aoi::{AoiAppState, AoiFeature, AoiGeometry, aoi_routes};
use landcover_server::hover::{LookupError, PeriodClass, PixelLookup, PixelResult};
use landcover_server::server::{AppState, spa_service, tile_routes, ws_handler};
use landcover_server::stats::{
    StatsAppState, StatsStore, SUMMARY_FILE, TRANSITION_MATRIX_FILE, stats_routes,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Pixel lookup that answers instantly
///
/// Points south of the equator are outside the classified area and come back as "No Data".
pub struct StubLookup;

pub fn forest_to_built_up() -> PixelResult {
    PixelResult::new(
        PeriodClass::classified(1, "Forest", 0.92),
        PeriodClass::classified(5, "Built-up", 0.81),
    )
}

pub fn no_data() -> PixelResult {
    PixelResult::new(
        PeriodClass::labelled("No Data"),
        PeriodClass::labelled("No Data"),
    )
}

#[async_trait]
impl PixelLookup for StubLookup {
    async fn query_pixel(&self, lat: f64, _lon: f64) -> Result<PixelResult, LookupError> {
        if lat < 0.0 {
            Ok(no_data())
        } else {
            Ok(forest_to_built_up())
        }
    }
}

/// Unit-square AOI around the origin
pub fn square_aoi() -> AoiFeature {
    AoiFeature::with_geometry(AoiGeometry::new(
        "Polygon",
        serde_json::json!([[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]),
    ))
}

/// Temporary stats directory holding both statistics documents
pub fn stats_fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("landcover-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create stats dir");
    std::fs::write(
        dir.join(SUMMARY_FILE),
        r#"{"2018": {"Forest": 412.3, "Built-up": 55.0}, "2023": {"Forest": 380.1, "Built-up": 87.2}}"#,
    )
    .expect("write summary");
    std::fs::write(
        dir.join(TRANSITION_MATRIX_FILE),
        r#"{"classes": ["Forest", "Built-up"], "matrix": [[380.1, 32.2], [0.0, 55.0]]}"#,
    )
    .expect("write matrix");
    dir
}

/// Create a test application router with state
pub fn create_test_app_with_state(stats_dir: PathBuf) -> (Router, AppState) {
    let app_state = AppState::new(Arc::new(StubLookup));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = aoi_routes(AoiAppState::from_feature(Some(&square_aoi()))).merge(stats_routes(
        StatsAppState {
            store: Arc::new(StatsStore::new(stats_dir)),
        },
    ));

    let app = Router::new()
        .route("/ws/hover", get(ws_handler))
        .with_state(app_state.clone())
        .nest("/api", api)
        .layer(cors);

    (app, app_state)
}

/// Create a test application router with all routes configured
pub fn create_test_app() -> Router {
    create_test_app_with_state(stats_fixture_dir()).0
}

/// Serve a router on a random local port
pub async fn start_test_server(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, handle)
}

#[derive(Deserialize)]
struct PixelParams {
    lat: f64,
    lon: f64,
}

/// Stand-in for the raster backend's `GET /api/pixel`
///
/// `lat < 0` answers no-data, `lat > 80` fails with 500, `lon > 170` returns a body that is not
/// JSON, anything else is forest turned built-up.
async fn stub_pixel(Query(params): Query<PixelParams>) -> Response {
    if params.lat > 80.0 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "raster unavailable").into_response();
    }
    if params.lon > 170.0 {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    if params.lat < 0.0 {
        return Json(serde_json::json!({
            "2018": {"class_name": "No Data"},
            "2023": {"class_name": "No Data"}
        }))
        .into_response();
    }
    Json(serde_json::json!({
        "2018": {"class_id": 1, "class_name": "Forest", "confidence": 0.92},
        "2023": {"class_id": 5, "class_name": "Built-up", "confidence": 0.81}
    }))
    .into_response()
}

/// Start a stub pixel service and return its base URL
pub async fn start_pixel_stub() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new().route("/api/pixel", get(stub_pixel));
    let (addr, handle) = start_test_server(app).await;
    (format!("http://{}", addr), handle)
}

/// Temporary frontend bundle and tile pyramid with a single 2018 tile
pub fn static_fixture_dirs() -> (PathBuf, PathBuf) {
    let root = std::env::temp_dir().join(format!("landcover-static-{}", uuid::Uuid::new_v4()));
    let app_dir = root.join("app");
    let tiles_dir = root.join("tiles");

    std::fs::create_dir_all(&app_dir).expect("create app dir");
    std::fs::write(app_dir.join("index.html"), "<html>dashboard</html>").expect("write index");

    let tile_dir = tiles_dir.join("lulc_2018").join("10").join("733");
    std::fs::create_dir_all(&tile_dir).expect("create tile dir");
    std::fs::write(tile_dir.join("480.png"), b"\x89PNG\r\n\x1a\n").expect("write tile");

    (app_dir, tiles_dir)
}

/// Router serving tiles and the frontend the way the binary does
pub fn create_static_app(app_dir: &Path, tiles_dir: &Path) -> Router {
    Router::new()
        .merge(tile_routes(tiles_dir))
        .fallback_service(spa_service(app_dir))
}
