//! Spotlight mask construction
//!
//! The mask is a polygon covering the whole world with the AOI boundary as its hole, so the
//! renderer shades everything outside the AOI. For the hole to render, the inner ring must be
//! wound opposite to the outer ring.

use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{AoiError, AoiFeature, AoiGeometry, MaskPolygon, Position, Ring};

/// World-covering outer ring, counter-clockwise
pub const WORLD_BOUNDS: [[f64; 2]; 5] = [
    [-180.0, -90.0],
    [180.0, -90.0],
    [180.0, 90.0],
    [-180.0, 90.0],
    [-180.0, -90.0],
];

pub fn world_ring() -> Ring {
    WORLD_BOUNDS.iter().map(|p| p.to_vec()).collect()
}

/// Twice the signed area of a ring (shoelace); positive means counter-clockwise
///
/// The mask hole must wind opposite to the outer ring. The builder reverses a boundary only when
/// this is non-negative, so a boundary supplied clockwise keeps its order.
pub fn signed_area(ring: &[Position]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum()
}

fn malformed(msg: impl Into<String>) -> AoiError {
    AoiError::MalformedGeometry(msg.into())
}

fn parse_position(value: &Value) -> Result<Position, AoiError> {
    let coords = value
        .as_array()
        .ok_or_else(|| malformed("position is not an array"))?;
    if coords.len() < 2 {
        return Err(malformed("position has fewer than two coordinates"));
    }
    coords
        .iter()
        .map(|c| {
            c.as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed("position coordinate is not a finite number"))
        })
        .collect()
}

fn parse_ring(value: Option<&Value>) -> Result<Ring, AoiError> {
    let positions = value
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("boundary ring is missing"))?;
    if positions.is_empty() {
        return Err(malformed("boundary ring is empty"));
    }
    positions.iter().map(parse_position).collect()
}

/// Outer ring of the AOI boundary
///
/// `Polygon` uses `coordinates[0]`; `MultiPolygon` uses the outer ring of its first member
/// only. Holes of the AOI itself are ignored.
pub fn extract_boundary_ring(geometry: &AoiGeometry) -> Result<Ring, AoiError> {
    let coordinates = geometry
        .coordinates
        .as_array()
        .ok_or_else(|| malformed(format!("{} coordinates are not an array", geometry.kind)))?;

    match geometry.kind.as_str() {
        "Polygon" => parse_ring(coordinates.first()),
        "MultiPolygon" => {
            let first = coordinates
                .first()
                .and_then(Value::as_array)
                .ok_or_else(|| malformed("MultiPolygon has no member polygon"))?;
            parse_ring(first.first())
        }
        other => Err(AoiError::UnsupportedGeometryType(other.to_string())),
    }
}

/// Build the mask, reporting why no mask could be built
///
/// `Ok(None)` means there was no boundary to mask, which is not an error.
pub fn try_build_mask(aoi: Option<&AoiFeature>) -> Result<Option<MaskPolygon>, AoiError> {
    let Some(geometry) = aoi.and_then(|f| f.geometry.as_ref()) else {
        return Ok(None);
    };

    let ring = extract_boundary_ring(geometry)?;

    let mut inner_ring = ring;
    // The world ring is counter-clockwise, so the hole must end up clockwise
    if signed_area(&inner_ring) >= 0.0 {
        inner_ring.reverse();
    } else {
        debug!("AOI boundary already clockwise, keeping its order for the mask hole");
    }

    Ok(Some(MaskPolygon {
        outer_ring: world_ring(),
        inner_ring,
    }))
}

/// Build the spotlight mask for an AOI
///
/// Absent AOI or geometry yields `None`. Malformed geometry is logged and also yields `None`.
pub fn build_mask(aoi: Option<&AoiFeature>) -> Option<MaskPolygon> {
    match try_build_mask(aoi) {
        Ok(mask) => mask,
        Err(e) => {
            counter!("landcover_aoi_mask_malformed_total").increment(1);
            warn!("Not masking AOI: {}", e);
            None
        }
    }
}
