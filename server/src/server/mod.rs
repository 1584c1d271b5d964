pub mod static_files;
pub mod websocket;

pub use static_files::{spa_service, tile_routes};
pub use websocket::{AppState, Connection, ConnectionRegistry, ws_handler};
