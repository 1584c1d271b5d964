//! Hover query types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a pixel lookup
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Pixel service request failed: {0}")]
    Transport(String),

    #[error("Pixel service timed out")]
    Timeout,

    #[error("Pixel service returned status {0}")]
    Status(u16),

    #[error("Failed to decode pixel response: {0}")]
    Decode(String),
}

/// Position on the map surface in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Geographic position (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One pointer-move event from the map surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub screen_position: ScreenPoint,
    pub geo_position: GeoPoint,
    pub timestamp_ms: u64,
}

impl PointerSample {
    pub fn new(screen_position: ScreenPoint, geo_position: GeoPoint, timestamp_ms: u64) -> Self {
        Self {
            screen_position,
            geo_position,
            timestamp_ms,
        }
    }
}

/// A lookup admitted by the throttle
///
/// `seq` is the generation of the query: strictly increasing per controller, and the only
/// thing a resolution is matched against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelQuery {
    pub seq: u64,
    pub lat: f64,
    pub lon: f64,
    pub issued_at_ms: u64,
}

/// Classification period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "2018")]
    Y2018,
    #[serde(rename = "2023")]
    Y2023,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Y2018, Period::Y2023];
}

/// Classification of a pixel for one period
///
/// The pixel service omits `class_id` and `confidence` for no-data pixels and may attach an
/// `error` string when a raster could not be sampled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Classifier confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PeriodClass {
    pub fn classified(class_id: i64, class_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            class_id: Some(class_id),
            class_name: Some(class_name.into()),
            confidence: Some(confidence),
            error: None,
        }
    }

    pub fn labelled(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }
}

/// Classification of a pixel for both periods, as returned by `GET /api/pixel`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelResult {
    #[serde(rename = "2018", default)]
    pub period_2018: PeriodClass,
    #[serde(rename = "2023", default)]
    pub period_2023: PeriodClass,
}

impl PixelResult {
    pub fn new(period_2018: PeriodClass, period_2023: PeriodClass) -> Self {
        Self {
            period_2018,
            period_2023,
        }
    }

    pub fn period(&self, period: Period) -> &PeriodClass {
        match period {
            Period::Y2018 => &self.period_2018,
            Period::Y2023 => &self.period_2023,
        }
    }
}

/// The only hover state exposed to rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HoverDisplayState {
    pub screen_position: Option<ScreenPoint>,
    pub result: Option<PixelResult>,
    pub loading: bool,
}
