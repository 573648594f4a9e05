//! Viewport abstraction and a Web Mercator implementation.
//!
//! The dashboard core never talks to a map widget directly. Everything it
//! needs (zoom, visible bounds, pixel size, projection) goes through the
//! [`Viewport`] trait so selection and advection can run against a real
//! map, a headless scenario or a test fixture alike.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{MapError, MapResult};
use crate::geo::{GeoBounds, LatLng, PixelPoint, PixelSize};

/// Tile edge length in pixels for the standard slippy-map pyramid.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Read-only view of the map as currently displayed.
pub trait Viewport {
    fn zoom(&self) -> u32;
    fn bounds(&self) -> GeoBounds;
    fn center(&self) -> LatLng;
    fn size(&self) -> PixelSize;

    /// Geographic coordinate to container pixel.
    fn project(&self, point: LatLng) -> PixelPoint;

    /// Container pixel to geographic coordinate.
    fn unproject(&self, pixel: PixelPoint) -> LatLng;
}

/// A Web Mercator (EPSG:3857) viewport in container pixel space.
///
/// The container origin is the top-left corner of the visible area, which
/// matches how browser map widgets report marker and canvas positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MercatorViewport {
    center: LatLng,
    zoom: u32,
    size: PixelSize,
}

impl MercatorViewport {
    pub fn new(center: LatLng, zoom: u32, size: PixelSize) -> MapResult<Self> {
        if !center.is_finite() || center.lat.abs() > MAX_LATITUDE {
            return Err(MapError::InvalidCoordinate(format!(
                "viewport center {:?} is outside the Mercator world",
                center
            )));
        }
        if size.width == 0 || size.height == 0 {
            return Err(MapError::InvalidViewport(format!(
                "zero-sized viewport {}x{}",
                size.width, size.height
            )));
        }
        if zoom > 22 {
            return Err(MapError::InvalidViewport(format!("zoom {} exceeds 22", zoom)));
        }
        Ok(Self { center, zoom, size })
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powi(self.zoom as i32)
    }

    /// Absolute pixel position in the world image at the current zoom.
    fn to_world(&self, point: LatLng) -> PixelPoint {
        let world = self.world_size();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin_lat = lat.to_radians().sin();

        let x = (point.lng + 180.0) / 360.0 * world;
        let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * world;
        PixelPoint::new(x, y)
    }

    fn from_world(&self, pixel: PixelPoint) -> LatLng {
        let world = self.world_size();
        let lng = pixel.x / world * 360.0 - 180.0;
        let n = PI - 2.0 * PI * pixel.y / world;
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// World pixel of the container's top-left corner.
    fn pixel_origin(&self) -> PixelPoint {
        let c = self.to_world(self.center);
        PixelPoint::new(
            c.x - self.size.width as f64 / 2.0,
            c.y - self.size.height as f64 / 2.0,
        )
    }

    /// Same viewport recentred, keeping zoom and size.
    pub fn with_center(&self, center: LatLng) -> MapResult<Self> {
        Self::new(center, self.zoom, self.size)
    }

    pub fn with_zoom(&self, zoom: u32) -> MapResult<Self> {
        Self::new(self.center, zoom, self.size)
    }
}

impl Viewport for MercatorViewport {
    fn zoom(&self) -> u32 {
        self.zoom
    }

    fn bounds(&self) -> GeoBounds {
        let north_west = self.unproject(PixelPoint::new(0.0, 0.0));
        let south_east = self.unproject(PixelPoint::new(
            self.size.width as f64,
            self.size.height as f64,
        ));
        GeoBounds {
            north: north_west.lat,
            south: south_east.lat,
            east: south_east.lng,
            west: north_west.lng,
        }
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn size(&self) -> PixelSize {
        self.size
    }

    fn project(&self, point: LatLng) -> PixelPoint {
        let world = self.to_world(point);
        let origin = self.pixel_origin();
        PixelPoint::new(world.x - origin.x, world.y - origin.y)
    }

    fn unproject(&self, pixel: PixelPoint) -> LatLng {
        let origin = self.pixel_origin();
        self.from_world(PixelPoint::new(pixel.x + origin.x, pixel.y + origin.y))
    }
}
