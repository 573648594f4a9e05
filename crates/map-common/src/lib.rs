//! Common types and utilities shared across the station dashboard crates.

pub mod error;
pub mod geo;
pub mod series;
pub mod station;
pub mod viewport;
pub mod wind;

pub use error::{MapError, MapResult};
pub use geo::{GeoBounds, LatLng, PixelPoint, PixelSize};
pub use series::SeriesPoint;
pub use station::{Station, StationLevel};
pub use viewport::{MercatorViewport, Viewport, TILE_SIZE};
pub use wind::{WindObservation, WindSample};
