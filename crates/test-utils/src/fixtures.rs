//! Common test fixtures for station-dashboard tests.
//!
//! Viewports and bounds here represent the recurring map states: the
//! national overview and a city-level view.

use map_common::{GeoBounds, LatLng, MercatorViewport, PixelSize};

/// Common bounding box definitions for testing, as (north, south, east, west).
pub mod bounds {
    /// Main Japanese islands, Okinawa excluded
    pub const JAPAN: (f64, f64, f64, f64) = (45.5, 30.0, 146.0, 129.0);

    /// Greater Tokyo area
    pub const KANTO: (f64, f64, f64, f64) = (37.0, 34.8, 140.9, 138.4);
}

/// Center of the national overview.
pub const NATIONAL_CENTER: LatLng = LatLng {
    lat: 37.5,
    lng: 137.5,
};

/// Tokyo Station.
pub const TOKYO: LatLng = LatLng {
    lat: 35.681,
    lng: 139.767,
};

pub fn japan_bounds() -> GeoBounds {
    let (north, south, east, west) = bounds::JAPAN;
    GeoBounds {
        north,
        south,
        east,
        west,
    }
}

pub fn kanto_bounds() -> GeoBounds {
    let (north, south, east, west) = bounds::KANTO;
    GeoBounds {
        north,
        south,
        east,
        west,
    }
}

/// Zoom 5 overview whose visible bounds contain all of [`bounds::JAPAN`].
pub fn national_viewport() -> MercatorViewport {
    MercatorViewport::new(NATIONAL_CENTER, 5, PixelSize::new(1280, 900))
        .expect("valid national viewport")
}

/// A laptop-sized viewport centred on Tokyo at `zoom`.
pub fn tokyo_viewport(zoom: u32) -> MercatorViewport {
    MercatorViewport::new(TOKYO, zoom, PixelSize::new(1024, 768)).expect("valid Tokyo viewport")
}
