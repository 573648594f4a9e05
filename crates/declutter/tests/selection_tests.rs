//! Property and scenario tests for the declutter pipeline.

use declutter::{filter_candidates, select_markers, Declutter, DensityParams, LevelThresholds};
use map_common::{PixelPoint, Station, StationLevel, Viewport};
use test_utils::{
    japan_bounds, kanto_bounds, mixed_level_catalog, national_viewport, random_catalog,
    tokyo_viewport,
};

/// Every accepted station keeps its own required spacing to all stations
/// accepted before it.
fn assert_spacing_invariant<V: Viewport>(viewport: &V, stations: &[&Station]) {
    let params = DensityParams::for_zoom(viewport.zoom());
    let size = viewport.size();
    let center = viewport.project(viewport.center());

    for (i, station) in stations.iter().enumerate() {
        let p = viewport.project(station.position());
        let required = params.required_distance(p, center, size);
        for earlier in &stations[..i] {
            let q = viewport.project(earlier.position());
            assert!(
                p.distance(&q) >= required,
                "{} is {:.2}px from {}, needs {:.2}px",
                station.code,
                p.distance(&q),
                earlier.code,
                required
            );
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_selection_never_exceeds_budget() {
    let catalog = mixed_level_catalog(11, 3000, &kanto_bounds());

    for zoom in 5..=14 {
        let vp = tokyo_viewport(zoom);
        let selection = Declutter::default().run(&catalog, &vp);
        assert!(
            selection.len() <= DensityParams::for_zoom(zoom).max_markers,
            "zoom {} selected {}",
            zoom,
            selection.len()
        );
    }
}

#[test]
fn test_spacing_holds_at_every_zoom() {
    let catalog = mixed_level_catalog(3, 2000, &kanto_bounds());

    for zoom in 5..=11 {
        let vp = tokyo_viewport(zoom);
        let selection = Declutter::default().run(&catalog, &vp);
        assert_spacing_invariant(&vp, selection.stations());
    }
}

#[test]
fn test_selection_is_idempotent() {
    let catalog = mixed_level_catalog(5, 1500, &kanto_bounds());
    let vp = tokyo_viewport(9);
    let declutter = Declutter::default();

    let first: Vec<String> = declutter.run(&catalog, &vp).iter().map(|s| s.code.clone()).collect();
    let second: Vec<String> = declutter.run(&catalog, &vp).iter().map(|s| s.code.clone()).collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_center_station_always_wins() {
    let catalog = random_catalog(21, 400, &kanto_bounds(), StationLevel::Coarse);
    let vp = tokyo_viewport(8);

    let candidates = filter_candidates(
        &catalog,
        &vp.bounds(),
        vp.center(),
        vp.zoom(),
        &LevelThresholds::MARKERS,
    );
    let selection = select_markers(&candidates, &vp, &DensityParams::for_zoom(8));

    assert_eq!(selection.stations()[0].code, candidates[0].station.code);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_national_view_with_1700_coarse_stations() {
    let catalog = random_catalog(42, 1700, &japan_bounds(), StationLevel::Coarse);
    let vp = national_viewport();

    let candidates = filter_candidates(
        &catalog,
        &vp.bounds(),
        vp.center(),
        vp.zoom(),
        &LevelThresholds::MARKERS,
    );
    assert_eq!(candidates.len(), 1700);

    let selection = select_markers(&candidates, &vp, &DensityParams::for_zoom(5));
    assert!(selection.len() <= 1000);
    assert!(!selection.is_empty());
    assert_spacing_invariant(&vp, selection.stations());
}

#[test]
fn test_two_stations_5px_apart_near_center() {
    let vp = national_viewport();
    let center_px = vp.project(vp.center());
    let a = vp.center();
    let b = vp.unproject(PixelPoint::new(center_px.x + 5.0, center_px.y));

    let catalog = vec![
        Station::new("a", "A", a.lat, a.lng, StationLevel::Coarse),
        Station::new("b", "B", b.lat, b.lng, StationLevel::Coarse),
    ];

    let selection = Declutter::default().run(&catalog, &vp);
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.stations()[0].code, "a");
}

#[test]
fn test_max_zoom_shows_everything_in_view() {
    let vp = tokyo_viewport(13);
    let bounds = vp.bounds();
    let catalog = random_catalog(8, 300, &bounds, StationLevel::Fine);

    let selection = Declutter::default().run(&catalog, &vp);
    assert_eq!(selection.len(), 300);
}

#[test]
fn test_stations_outside_view_are_never_selected() {
    let catalog = random_catalog(9, 500, &japan_bounds(), StationLevel::Coarse);
    let vp = tokyo_viewport(10);
    let bounds = vp.bounds();

    let selection = Declutter::default().run(&catalog, &vp);
    assert!(selection.iter().all(|s| bounds.contains(&s.position())));
}
