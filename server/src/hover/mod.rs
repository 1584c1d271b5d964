//! Hover query pipeline
//!
//! Turns pointer movement over the map into throttled pixel classification lookups and a
//! single display state for the tooltip.

pub mod controller;
pub mod display;
pub mod remote;
pub mod service;
pub mod session;
pub mod types;

pub use controller::{HoverQueryController, PointerPhase, Resolution};
pub use display::{HoverView, NoDataLabels};
pub use remote::HttpPixelLookup;
pub use service::PixelLookup;
pub use session::{HoverEvent, HoverSession};
pub use types::{
    GeoPoint, HoverDisplayState, LookupError, Period, PeriodClass, PixelQuery, PixelResult,
    PointerSample, ScreenPoint,
};
