//! Inverse distance weighting over scattered wind samples.

use map_common::{LatLng, WindSample};
use serde::{Deserialize, Serialize};

/// Added to every squared distance before taking the reciprocal.
///
/// Keeps the weight finite for a query exactly on a sample and bounds how
/// much a single sample can dominate nearby queries.
pub const IDW_EPSILON: f64 = 0.01;

/// A wind vector: `u` eastward, `v` northward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub const ZERO: WindVector = WindVector { u: 0.0, v: 0.0 };
}

/// Continuous wind field reconstructed from point samples.
///
/// Every sample contributes to every query with weight
/// `1 / (dist_sq + IDW_EPSILON)`, distance measured in degrees. Query cost is
/// linear in the number of samples.
#[derive(Debug, Clone, Default)]
pub struct IdwField {
    samples: Vec<WindSample>,
}

impl IdwField {
    pub fn new(samples: impl IntoIterator<Item = WindSample>) -> Self {
        let mut field = Self::default();
        field.set_samples(samples);
        field
    }

    /// Replace the sample set wholesale.
    ///
    /// Samples with non-finite components are dropped so one bad
    /// observation cannot turn the whole field into NaN.
    pub fn set_samples(&mut self, samples: impl IntoIterator<Item = WindSample>) {
        self.samples.clear();
        self.samples
            .extend(samples.into_iter().filter(WindSample::is_finite));
    }

    pub fn samples(&self) -> &[WindSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interpolated wind at `at`. Zero when there are no samples.
    pub fn sample(&self, at: LatLng) -> WindVector {
        if self.samples.is_empty() {
            return WindVector::ZERO;
        }

        let mut total_weight = 0.0;
        let mut u = 0.0;
        let mut v = 0.0;

        for s in &self.samples {
            let dx = at.lng - s.lng;
            let dy = at.lat - s.lat;
            let weight = 1.0 / (dx * dx + dy * dy + IDW_EPSILON);
            u += s.u * weight;
            v += s.v * weight;
            total_weight += weight;
        }

        WindVector {
            u: u / total_weight,
            v: v / total_weight,
        }
    }
}
