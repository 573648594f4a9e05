//! Weather overlay scenarios against a scripted provider.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::ScriptedProvider;
use map_common::{GeoBounds, Station, StationLevel};
use markers::{WeatherConfig, WeatherOverlay, WindCache};
use storage::DEFAULT_TTL;
use test_utils::{
    grid_catalog, japan_bounds, national_viewport, random_catalog, tokyo_viewport, TOKYO,
};
use tokio::time::Instant;

fn overlay(
    provider: &Arc<ScriptedProvider>,
    batch_size: usize,
) -> (WeatherOverlay, tokio::sync::watch::Receiver<Arc<Vec<map_common::WindSample>>>) {
    let cache = Arc::new(WindCache::new(1000, DEFAULT_TTL));
    WeatherOverlay::new(
        provider.clone(),
        cache,
        WeatherConfig {
            batch_size,
            batch_pause_ms: 500,
        },
    )
}

/// 100 coarse stations packed around Tokyo, all visible at zoom 10.
fn tokyo_catalog() -> Vec<Station> {
    let bounds = GeoBounds {
        north: TOKYO.lat + 0.2,
        south: TOKYO.lat - 0.2,
        east: TOKYO.lng + 0.2,
        west: TOKYO.lng - 0.2,
    };
    grid_catalog(&bounds, 10, 10, StationLevel::Coarse, "w")
}

#[tokio::test]
async fn test_national_view_uses_six_stations() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let (overlay, rx) = overlay(&provider, 50);
    let catalog = random_catalog(3, 500, &japan_bounds(), StationLevel::Coarse);

    let report = overlay.update(&catalog, &national_viewport()).await;
    assert_eq!(report.targeted, 6);
    assert_eq!(report.fetched, 6);
    assert_eq!(report.published, 6);
    assert_eq!(provider.wind_calls(), 6);

    // West wind (from 270 degrees) blows eastward
    let samples = rx.borrow().clone();
    assert_eq!(samples.len(), 6);
    assert!(samples.iter().all(|s| (s.u - 5.0).abs() < 1e-9 && s.v.abs() < 1e-9));
}

#[tokio::test]
async fn test_cached_stations_are_not_refetched() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let (overlay, _rx) = overlay(&provider, 50);
    let catalog = tokyo_catalog();
    let vp = tokyo_viewport(10);

    let first = overlay.update(&catalog, &vp).await;
    assert_eq!(first.targeted, 35);
    let second = overlay.update(&catalog, &vp).await;

    assert_eq!(second.cached, 35);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.published, 35);
    assert_eq!(provider.wind_calls(), 35);
}

#[tokio::test(start_paused = true)]
async fn test_batches_pause_between_requests() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let (overlay, _rx) = overlay(&provider, 10);
    let catalog = tokyo_catalog();

    let started = Instant::now();
    let report = overlay.update(&catalog, &tokyo_viewport(10)).await;

    // 35 targets in batches of 10: four batches, three pauses
    assert_eq!(report.batches, 4);
    assert_eq!(report.fetched, 35);
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert!(started.elapsed() < Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_stops_remaining_batches() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()).with_wind_limit(15));
    let (overlay, rx) = overlay(&provider, 10);
    let catalog = tokyo_catalog();

    let report = overlay.update(&catalog, &tokyo_viewport(10)).await;

    assert!(report.rate_limited);
    assert_eq!(report.batches, 2);
    assert_eq!(report.fetched, 15);
    assert_eq!(provider.wind_calls(), 20);
    // Samples gathered before the limit are still published
    assert_eq!(rx.borrow().len(), 15);
}

#[tokio::test]
async fn test_missing_observations_produce_no_samples() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()).without_wind());
    let (overlay, rx) = overlay(&provider, 50);

    let report = overlay.update(&tokyo_catalog(), &tokyo_viewport(10)).await;
    assert_eq!(report.fetched, 0);
    assert_eq!(report.published, 0);
    assert!(rx.borrow().is_empty());
}

#[tokio::test]
async fn test_overlay_uses_its_own_detail_levels() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let (overlay, _rx) = overlay(&provider, 50);
    let bounds = GeoBounds {
        north: TOKYO.lat + 0.2,
        south: TOKYO.lat - 0.2,
        east: TOKYO.lng + 0.2,
        west: TOKYO.lng - 0.2,
    };
    let catalog = grid_catalog(&bounds, 4, 4, StationLevel::Medium, "m");

    // Level 2 is on for markers at zoom 6 but only from zoom 8 for weather
    assert!(overlay.targets(&catalog, &tokyo_viewport(7)).is_empty());
    assert_eq!(overlay.targets(&catalog, &tokyo_viewport(8)).len(), 12);
}
