//! Deterministic offline data source.
//!
//! Used with `--offline` and by the scenario tests. Every series is a pure
//! function of (seed, station code, day), so repeated requests agree with
//! each other and with the cache.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use map_common::{GeoBounds, LatLng, SeriesPoint, Station, StationLevel, WindObservation};
use markers::{DataProvider, ProviderError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mainland Japan, used for generated catalogs.
pub const JAPAN_BOUNDS: GeoBounds = GeoBounds {
    north: 45.5,
    south: 31.0,
    east: 145.8,
    west: 129.5,
};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn day_rng(&self, code: &str, day: NaiveDate) -> StdRng {
        let mixed = code
            .bytes()
            .fold(self.seed ^ 0xcbf2_9ce4_8422_2325, |h, b| {
                (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });
        StdRng::seed_from_u64(mixed ^ day.num_days_from_ce() as u64)
    }

    /// Hourly readings for one JST day, with the occasional gap.
    fn day_series(&self, code: &str, day: NaiveDate) -> Vec<SeriesPoint> {
        let mut rng = self.day_rng(code, day);
        let level: f64 = rng.gen_range(0.0..10.0);
        let midnight = jst_midnight(day);

        (0..24)
            .map(|hour| {
                let ts = midnight + Duration::hours(hour);
                // Midday peak
                let shape = 1.0 + (std::f64::consts::PI * (hour as f64 - 6.0) / 12.0).sin();
                let value = if rng.gen_bool(0.05) {
                    None
                } else {
                    Some((level * shape + rng.gen_range(0.0..2.0)).round())
                };
                SeriesPoint::new(ts, value)
            })
            .collect()
    }
}

#[async_trait]
impl DataProvider for SyntheticProvider {
    async fn fetch_station_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let mut points = Vec::new();
        let mut day = start;
        while day <= end {
            points.extend(self.day_series(code, day));
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(points)
    }

    async fn fetch_wind_observation(
        &self,
        at: LatLng,
    ) -> Result<Option<WindObservation>, ProviderError> {
        if !at.is_finite() {
            return Ok(None);
        }
        // Prevailing westerlies that veer and strengthen smoothly with position
        let phase = self.seed as f64 * 0.1;
        let speed = 4.0 + 2.5 * (at.lat * 0.4 + phase).sin() + 1.5 * (at.lng * 0.3).cos();
        let direction = 270.0 + 35.0 * (at.lng * 0.25 + phase).sin() - 20.0 * (at.lat * 0.5).cos();
        Ok(Some(WindObservation {
            speed: speed.max(0.0),
            direction_deg: direction.rem_euclid(360.0),
        }))
    }
}

fn jst_midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)) - Duration::hours(9)
}

/// A reproducible catalog of `count` stations across Japan with levels in
/// a 1:3:6 ratio.
pub fn synthetic_catalog(seed: u64, count: usize) -> Vec<Station> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let level = match i % 10 {
                0 => StationLevel::Coarse,
                1..=3 => StationLevel::Medium,
                _ => StationLevel::Fine,
            };
            let lat = rng.gen_range(JAPAN_BOUNDS.south..=JAPAN_BOUNDS.north);
            let lng = rng.gen_range(JAPAN_BOUNDS.west..=JAPAN_BOUNDS.east);
            Station::new(format!("{:05}", 10000 + i), format!("Synthetic {}", i), lat, lng, level)
        })
        .collect()
}
