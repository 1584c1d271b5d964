use crate::config::HoverConfig;
use crate::hover::{
    GeoPoint, HoverEvent, HoverSession, HoverView, NoDataLabels, PixelLookup, PointerSample,
    ScreenPoint,
};
use crate::protocol::{ClientMessage, ErrorCode, ServerMessage};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::{
    collections::HashMap,
    sync::Arc,
    time::Instant,
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Connection state for a single client
pub struct Connection {
    pub id: Uuid,
    pub connected_at: Instant,
}

/// Global connection registry
pub type ConnectionRegistry = Arc<RwLock<HashMap<Uuid, Connection>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub connections: ConnectionRegistry,
    pub pixel_lookup: Arc<dyn PixelLookup>,
    pub hover: HoverConfig,
    pub no_data_labels: NoDataLabels,
}

impl AppState {
    pub fn new(pixel_lookup: Arc<dyn PixelLookup>) -> Self {
        let hover = HoverConfig::default();
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            pixel_lookup,
            no_data_labels: NoDataLabels::new(hover.no_data_labels.clone()),
            hover,
        }
    }

    pub fn with_hover_config(mut self, hover: HoverConfig) -> Self {
        self.no_data_labels = NoDataLabels::new(hover.no_data_labels.clone());
        self.hover = hover;
        self
    }

    /// Number of open WebSocket connections
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    info!("New hover connection: {}", connection_id);

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    // Register connection; pointer samples are timed against its monotonic start
    let connected_at = Instant::now();
    {
        let mut connections = state.connections.write().await;
        connections.insert(
            connection_id,
            Connection {
                id: connection_id,
                connected_at,
            },
        );
    }

    let session = HoverSession::spawn(state.pixel_lookup.clone(), &state.hover);

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Spawn task to forward outgoing messages to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Spawn task pushing every display change to the client
    let mut display = session.subscribe();
    let display_tx = tx.clone();
    let labels = state.no_data_labels.clone();
    let display_task = tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let view = HoverView::from_state(&display.borrow_and_update(), &labels);
            if display_tx
                .send(ServerMessage::HoverState { view })
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(msg) => match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if !handle_client_message(client_msg, connected_at, &session, &tx).await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        let _ = tx
                            .send(ServerMessage::Error {
                                code: ErrorCode::InvalidMessage,
                                message: format!("Invalid message format: {}", e),
                            })
                            .await;
                    }
                },
                Message::Binary(_) => {
                    debug!("Ignoring binary message from {}", connection_id);
                    let _ = tx
                        .send(ServerMessage::Error {
                            code: ErrorCode::UnsupportedMessage,
                            message: "Binary messages are not supported".to_string(),
                        })
                        .await;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Handled by axum automatically
                }
                Message::Close(_) => {
                    info!("Client {} requested close", connection_id);
                    break;
                }
            },
            Err(e) => {
                error!("WebSocket error for {}: {}", connection_id, e);
                break;
            }
        }
    }

    // Cleanup
    session.shutdown().await;
    display_task.abort();
    send_task.abort();

    // Remove from registry
    let session_length = {
        let mut connections = state.connections.write().await;
        connections
            .remove(&connection_id)
            .map(|c| c.connected_at.elapsed())
    };

    info!(
        "Hover connection closed: {} (open for {:?})",
        connection_id,
        session_length.unwrap_or_default()
    );
}

/// Handle a parsed client message; returns false when the hover session has stopped
async fn handle_client_message(
    msg: ClientMessage,
    connected_at: Instant,
    session: &HoverSession,
    tx: &mpsc::Sender<ServerMessage>,
) -> bool {
    match msg {
        ClientMessage::PointerMove { x, y, lat, lon } => {
            let sample = PointerSample::new(
                ScreenPoint { x, y },
                GeoPoint { lat, lon },
                connected_at.elapsed().as_millis() as u64,
            );
            session.send(HoverEvent::Move(sample)).await
        }
        ClientMessage::PointerLeave => session.send(HoverEvent::Leave).await,
        ClientMessage::Ping { seq } => {
            let _ = tx.send(ServerMessage::Pong { seq }).await;
            true
        }
    }
}
