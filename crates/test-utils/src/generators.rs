//! Synthetic station catalog generators.
//!
//! These generators create predictable, reproducible catalogs that can be
//! used across the test suite. Random catalogs are seeded so a failing
//! test always sees the same stations.

use map_common::{GeoBounds, Station, StationLevel, WindSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a regular `rows` x `cols` grid of stations covering `bounds`.
///
/// Station codes are `"{prefix}-{row}-{col}"`, rows running north to south.
pub fn grid_catalog(
    bounds: &GeoBounds,
    rows: usize,
    cols: usize,
    level: StationLevel,
    prefix: &str,
) -> Vec<Station> {
    let lat_step = if rows > 1 {
        (bounds.north - bounds.south) / (rows - 1) as f64
    } else {
        0.0
    };
    let lng_step = if cols > 1 {
        (bounds.east - bounds.west) / (cols - 1) as f64
    } else {
        0.0
    };

    let mut stations = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let code = format!("{}-{}-{}", prefix, row, col);
            stations.push(Station::new(
                code.clone(),
                code,
                bounds.north - row as f64 * lat_step,
                bounds.west + col as f64 * lng_step,
                level,
            ));
        }
    }
    stations
}

/// Creates `count` stations of one level uniformly scattered in `bounds`.
pub fn random_catalog(
    seed: u64,
    count: usize,
    bounds: &GeoBounds,
    level: StationLevel,
) -> Vec<Station> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let lat = rng.gen_range(bounds.south..=bounds.north);
            let lng = rng.gen_range(bounds.west..=bounds.east);
            Station::new(format!("{:05}", i), format!("Station {}", i), lat, lng, level)
        })
        .collect()
}

/// Creates a scattered catalog with levels 1, 2 and 3 in a 1:3:6 ratio,
/// roughly the shape of a real municipality catalog.
pub fn mixed_level_catalog(seed: u64, count: usize, bounds: &GeoBounds) -> Vec<Station> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let level = match i % 10 {
                0 => StationLevel::Coarse,
                1..=3 => StationLevel::Medium,
                _ => StationLevel::Fine,
            };
            let lat = rng.gen_range(bounds.south..=bounds.north);
            let lng = rng.gen_range(bounds.west..=bounds.east);
            Station::new(format!("{:05}", i), format!("Station {}", i), lat, lng, level)
        })
        .collect()
}

/// Creates `count` wind samples scattered in `bounds` with speeds up to
/// `max_speed` in each component.
pub fn random_wind_samples(
    seed: u64,
    count: usize,
    bounds: &GeoBounds,
    max_speed: f64,
) -> Vec<WindSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| WindSample {
            lat: rng.gen_range(bounds.south..=bounds.north),
            lng: rng.gen_range(bounds.west..=bounds.east),
            u: rng.gen_range(-max_speed..=max_speed),
            v: rng.gen_range(-max_speed..=max_speed),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::japan_bounds;

    #[test]
    fn test_grid_catalog_corners() {
        let bounds = japan_bounds();
        let grid = grid_catalog(&bounds, 3, 4, StationLevel::Coarse, "g");
        assert_eq!(grid.len(), 12);
        assert_eq!(grid[0].lat, bounds.north);
        assert_eq!(grid[0].lng, bounds.west);
        assert_eq!(grid[11].code, "g-2-3");
        assert!((grid[11].lat - bounds.south).abs() < 1e-9);
        assert!((grid[11].lng - bounds.east).abs() < 1e-9);
    }

    #[test]
    fn test_random_catalog_is_reproducible() {
        let bounds = japan_bounds();
        let a = random_catalog(7, 100, &bounds, StationLevel::Coarse);
        let b = random_catalog(7, 100, &bounds, StationLevel::Coarse);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| bounds.contains(&s.position())));
    }

    #[test]
    fn test_mixed_levels() {
        let stations = mixed_level_catalog(1, 100, &japan_bounds());
        let coarse = stations.iter().filter(|s| s.level == StationLevel::Coarse).count();
        assert_eq!(coarse, 10);
    }

    #[test]
    fn test_wind_samples_in_bounds() {
        let bounds = japan_bounds();
        let samples = random_wind_samples(3, 50, &bounds, 10.0);
        assert_eq!(samples.len(), 50);
        assert!(samples.iter().all(|s| bounds.contains(&s.position()) && s.u.abs() <= 10.0));
    }
}
