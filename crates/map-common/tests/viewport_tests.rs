//! Tests for the Mercator viewport against known geometry.

use map_common::{GeoBounds, LatLng, MercatorViewport, PixelPoint, PixelSize, Viewport};

// ============================================================================
// Projection tests
// ============================================================================

#[test]
fn test_world_at_zoom_zero_is_one_tile() {
    let vp = MercatorViewport::new(LatLng::new(0.0, 0.0), 0, PixelSize::new(256, 256)).unwrap();

    let west = vp.project(LatLng::new(0.0, -180.0));
    let east = vp.project(LatLng::new(0.0, 180.0));
    assert!(west.x.abs() < 1e-9);
    assert!((east.x - 256.0).abs() < 1e-9);
}

#[test]
fn test_corners_unproject_to_bounds() {
    let vp = MercatorViewport::new(LatLng::new(36.0, 138.0), 5, PixelSize::new(1024, 768)).unwrap();
    let bounds = vp.bounds();

    let top_left = vp.unproject(PixelPoint::new(0.0, 0.0));
    assert!((top_left.lat - bounds.north).abs() < 1e-9);
    assert!((top_left.lng - bounds.west).abs() < 1e-9);

    let p = vp.project(LatLng::new(bounds.south, bounds.east));
    assert!((p.x - 1024.0).abs() < 1e-6);
    assert!((p.y - 768.0).abs() < 1e-6);
}

#[test]
fn test_national_view_covers_japan() {
    let vp = MercatorViewport::new(LatLng::new(36.5, 137.0), 5, PixelSize::new(1280, 900)).unwrap();
    let bounds = vp.bounds();

    let sapporo = LatLng::new(43.06, 141.35);
    let fukuoka = LatLng::new(33.59, 130.40);
    assert!(bounds.contains(&sapporo));
    assert!(bounds.contains(&fukuoka));
}

#[test]
fn test_with_zoom_keeps_center() {
    let vp = MercatorViewport::new(LatLng::new(35.0, 135.0), 5, PixelSize::new(800, 600)).unwrap();
    let zoomed = vp.with_zoom(9).unwrap();
    assert_eq!(zoomed.center(), vp.center());
    assert_eq!(zoomed.zoom(), 9);
}

// ============================================================================
// Bounds tests
// ============================================================================

#[test]
fn test_bounds_center() {
    let bounds = GeoBounds::new(46.0, 24.0, 146.0, 122.0).unwrap();
    let c = bounds.center();
    assert_eq!(c.lat, 35.0);
    assert_eq!(c.lng, 134.0);
}

#[test]
fn test_bounds_rejects_nan() {
    assert!(GeoBounds::new(f64::NAN, 0.0, 1.0, 0.0).is_err());
}
