//! Wind observations and the vector samples derived from them.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// A raw wind report: speed and the direction the wind blows FROM.
///
/// Direction is in degrees clockwise from north (meteorological convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    pub speed: f64,
    pub direction_deg: f64,
}

/// A wind vector anchored at a geographic point.
///
/// `u` is the eastward component and `v` the northward component, in the
/// same unit as the observation speed. Samples are immutable; a new
/// observation for the same station replaces the sample wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub lat: f64,
    pub lng: f64,
    pub u: f64,
    pub v: f64,
}

impl WindSample {
    /// Convert an observation at `at` into U/V components.
    ///
    /// Returns `None` when speed, direction or position is not finite.
    pub fn from_observation(at: LatLng, obs: &WindObservation) -> Option<Self> {
        if !(obs.speed.is_finite() && obs.direction_deg.is_finite() && at.is_finite()) {
            return None;
        }
        let dir = obs.direction_deg.to_radians();
        Some(Self {
            lat: at.lat,
            lng: at.lng,
            u: -obs.speed * dir.sin(),
            v: -obs.speed * dir.cos(),
        })
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.u.is_finite() && self.v.is_finite()
    }

    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: f64, direction_deg: f64) -> WindSample {
        WindSample::from_observation(
            LatLng::new(35.0, 139.0),
            &WindObservation {
                speed,
                direction_deg,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_north_wind_blows_south() {
        // Wind FROM the north moves air southward: v < 0
        let s = sample(10.0, 0.0);
        assert!(s.u.abs() < 1e-9);
        assert!((s.v + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_west_wind_blows_east() {
        let s = sample(4.0, 270.0);
        assert!((s.u - 4.0).abs() < 1e-9);
        assert!(s.v.abs() < 1e-9);
    }

    #[test]
    fn test_speed_is_preserved() {
        let s = sample(7.5, 123.0);
        assert!((s.speed() - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_observation_is_dropped() {
        let obs = WindObservation {
            speed: f64::NAN,
            direction_deg: 90.0,
        };
        assert!(WindSample::from_observation(LatLng::new(0.0, 0.0), &obs).is_none());
    }
}
