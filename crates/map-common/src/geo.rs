//! Geographic and screen-space primitives.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Squared Euclidean distance in degree units.
    ///
    /// This is a ranking metric, not a geodesic distance: latitude and
    /// longitude degrees are treated as the same unit.
    pub fn dist_sq(&self, other: &LatLng) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        dlat * dlat + dlng * dlng
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A geographic bounding box (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Create bounds, rejecting inverted latitudes.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> MapResult<Self> {
        if !(north.is_finite() && south.is_finite() && east.is_finite() && west.is_finite()) {
            return Err(MapError::InvalidBounds("non-finite edge".to_string()));
        }
        if south > north {
            return Err(MapError::InvalidBounds(format!(
                "south {} is above north {}",
                south, north
            )));
        }
        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Parse a "west,south,east,north" string (the usual bbox order).
    pub fn from_bbox_string(s: &str) -> MapResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(MapError::InvalidBounds(format!(
                "{}. Expected 'west,south,east,north'",
                s
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| MapError::InvalidBounds(format!("invalid number: {}", part)))?;
        }

        let [west, south, east, north] = values;
        Self::new(north, south, east, west)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

/// A position in container pixel space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Distance from the screen center to a corner.
    pub fn half_diagonal(&self) -> f64 {
        let hw = self.width as f64 / 2.0;
        let hh = self.height as f64 / 2.0;
        (hw * hw + hh * hh).sqrt()
    }

    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Whether a point lies on the surface (edges inclusive).
    pub fn contains(&self, point: &PixelPoint) -> bool {
        point.x >= 0.0
            && point.x <= self.width as f64
            && point.y >= 0.0
            && point.y <= self.height as f64
    }
}
