use serde::{Deserialize, Serialize};

use crate::hover::HoverView;

/// Client to Server messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Pointer moved over the map (container pixels + WGS84 position)
    PointerMove { x: f64, y: f64, lat: f64, lon: f64 },
    /// Pointer left the map surface
    PointerLeave,
    /// Ping for keepalive
    Ping { seq: u64 },
}

/// Server to Client messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Hover tooltip state changed
    HoverState { view: HoverView },
    /// Pong response (to client's Ping)
    Pong { seq: u64 },
    /// Client sent something the server could not handle
    Error { code: ErrorCode, message: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessage,
    UnsupportedMessage,
}
