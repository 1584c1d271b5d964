//! Area-of-interest spotlight mask
//!
//! Derives a world-covering polygon with the AOI cut out as a hole, for shading everything
//! outside the study area.

pub mod mask;
pub mod routes;
pub mod types;

pub use mask::{WORLD_BOUNDS, build_mask, extract_boundary_ring, try_build_mask};
pub use routes::{AoiAppState, MaskResponse, aoi_routes};
pub use types::{AoiError, AoiFeature, AoiGeometry, MaskFeature, MaskPolygon, Ring};
