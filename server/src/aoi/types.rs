//! AOI-related types and error definitions

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when working with AOI boundaries
#[derive(Debug, Error)]
pub enum AoiError {
    #[error("Malformed AOI geometry: {0}")]
    MalformedGeometry(String),

    #[error("Unsupported AOI geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("Failed to parse AOI: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// GeoJSON position: `[lon, lat]`, optionally followed by altitude
pub type Position = Vec<f64>;

/// Closed sequence of positions
pub type Ring = Vec<Position>;

/// Area-of-interest feature as supplied by the dataset or the user
///
/// Only `geometry` matters for masking. It is optional: a feature without geometry simply
/// produces no mask.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AoiFeature {
    #[serde(default)]
    pub geometry: Option<AoiGeometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Boundary geometry
///
/// `coordinates` stays untyped until the mask builder validates it against `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

impl AoiGeometry {
    pub fn new(kind: impl Into<String>, coordinates: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            coordinates,
        }
    }
}

impl AoiFeature {
    pub fn with_geometry(geometry: AoiGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            properties: None,
        }
    }

    /// Interpret arbitrary JSON as an optional AOI feature (`null` means no AOI)
    pub fn from_value(value: serde_json::Value) -> Result<Option<Self>, AoiError> {
        serde_json::from_value(value).map_err(|e| AoiError::ParseError(e.to_string()))
    }

    /// Read an AOI feature from a GeoJSON file
    pub fn from_path(path: &Path) -> Result<Option<Self>, AoiError> {
        let bytes = std::fs::read(path)?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| AoiError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }
}

/// Spotlight mask: the world with the AOI cut out
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPolygon {
    pub outer_ring: Ring,
    /// AOI boundary, wound opposite to `outer_ring`
    pub inner_ring: Ring,
}

/// GeoJSON geometry of a mask feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Ring>,
}

/// GeoJSON feature handed to the map renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: MaskGeometry,
}

impl MaskPolygon {
    pub fn to_feature(&self) -> MaskFeature {
        MaskFeature {
            kind: "Feature".to_string(),
            properties: serde_json::Map::new(),
            geometry: MaskGeometry {
                kind: "Polygon".to_string(),
                coordinates: vec![self.outer_ring.clone(), self.inner_ring.clone()],
            },
        }
    }
}
