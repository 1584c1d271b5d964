//! Static file services: map tiles and the frontend bundle

use axum::Router;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::compression::{Compression, CompressionLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Raster tiles under `/tiles/{layer}/{z}/{x}/{y}.png`
///
/// No SPA fallback: a missing tile is a 404 so the map leaves the cell empty.
pub fn tile_routes(tiles_dir: impl AsRef<Path>) -> Router {
    Router::new().nest_service("/tiles", ServeDir::new(tiles_dir))
}

/// Frontend bundle with SPA fallback to `index.html` for unmatched paths
pub fn spa_service(static_dir: impl AsRef<Path>) -> Compression<ServeDir<ServeFile>> {
    let static_dir = static_dir.as_ref();
    let serve_dir =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    ServiceBuilder::new()
        .layer(CompressionLayer::new())
        .service(serve_dir)
}
