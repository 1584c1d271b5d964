use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use landcover_server::aoi::{AoiAppState, AoiFeature, aoi_routes};
use landcover_server::config::Config;
use landcover_server::hover::HttpPixelLookup;
use landcover_server::server::{AppState, spa_service, tile_routes, ws_handler};
use landcover_server::stats::{StatsAppState, StatsStore, stats_routes};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    pixel_service: &'static str,
    hover_connections: usize,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> (axum::http::StatusCode, Json<HealthResponse>) {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    let pixel_ready = state.pixel_lookup.is_reachable().await;

    let (status, pixel_status, http_status) = if pixel_ready {
        ("healthy", "ready", axum::http::StatusCode::OK)
    } else {
        (
            "degraded",
            "unavailable",
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
        )
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            pixel_service: pixel_status,
            hover_connections: state.connection_count().await,
            uptime_seconds: uptime,
        }),
    )
}

/// Prometheus metrics handle for exposing metrics in Prometheus format
static PROMETHEUS_HANDLE: std::sync::OnceLock<PrometheusHandle> = std::sync::OnceLock::new();

/// Endpoint to expose metrics in Prometheus format
async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Update gauge metrics (called periodically)
async fn update_gauge_metrics(state: &AppState) {
    let connections = state.connection_count().await;
    metrics::gauge!("landcover_ws_connections_active").set(connections as f64);

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    metrics::gauge!("landcover_uptime_seconds").set(uptime as f64);
}

/// Load the configured AOI, logging why it could not be used
fn load_aoi(config: &Config) -> Option<AoiFeature> {
    let path = config.aoi.boundary_path.as_ref()?;
    match AoiFeature::from_path(path) {
        Ok(Some(aoi)) => {
            info!("Loaded AOI boundary from {:?}", path);
            Some(aoi)
        }
        Ok(None) => {
            warn!("AOI file {:?} is null, no mask will be served", path);
            None
        }
        Err(e) => {
            warn!("Failed to load AOI boundary {:?}: {}", path, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Record server start time
    START_TIME.set(Instant::now()).ok();

    // Initialize Prometheus metrics recorder (must be done before any metrics are recorded)
    let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
    PROMETHEUS_HANDLE.set(prometheus_handle).ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landcover=debug,landcover_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: host={}, port={}",
        config.host, config.port
    );
    info!(
        "Pixel service: {} (timeout {:?}), hover throttle {:?}, no-data labels {:?}",
        config.pixel_service.base_url,
        config.pixel_service.request_timeout,
        config.hover.throttle_interval,
        config.hover.no_data_labels
    );

    let pixel_lookup = Arc::new(HttpPixelLookup::new(&config.pixel_service)?);

    let app_state = AppState::new(pixel_lookup).with_hover_config(config.hover.clone());

    let aoi = load_aoi(&config);
    let aoi_state = AoiAppState::from_feature(aoi.as_ref());
    if aoi_state.configured_mask.is_none() {
        info!("No AOI mask configured (AOI_BOUNDARY_PATH unset or unusable)");
    }

    if !config.stats.stats_dir.is_dir() {
        warn!(
            "Stats directory {:?} does not exist - summary endpoints will return 404",
            config.stats.stats_dir
        );
    }
    let stats_state = StatsAppState {
        store: Arc::new(StatsStore::new(&config.stats.stats_dir)),
    };

    // Periodic update of gauge metrics (every 5 seconds)
    let metrics_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            update_gauge_metrics(&metrics_state).await;
        }
    });

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    if config.tiles.dir.is_dir() {
        info!("Serving map tiles from: {:?}", config.tiles.dir);
    } else {
        warn!(
            "Tiles directory {:?} does not exist - /tiles requests will return 404",
            config.tiles.dir
        );
    }

    // The AOI and stats routes carry their own state, so they are nested after AppState is set
    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .route("/ws/hover", get(ws_handler))
        .with_state(app_state)
        .nest("/api", aoi_routes(aoi_state).merge(stats_routes(stats_state)))
        .merge(tile_routes(&config.tiles.dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Add static file serving if configured
    let app = if let Some(ref static_dir) = config.static_files.dir {
        if static_dir.exists() {
            info!("Serving static files from: {:?}", static_dir);
            app.fallback_service(spa_service(static_dir))
        } else {
            warn!(
                "Static files directory not found: {:?} - static file serving disabled",
                static_dir
            );
            app
        }
    } else {
        info!("Static file serving disabled (STATIC_FILES_DIR not set)");
        app
    };

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Land-cover dashboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
