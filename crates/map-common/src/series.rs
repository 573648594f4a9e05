//! Station time series readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reading from a station series.
///
/// `value` is `None` when the provider reported a missing, negative or
/// unparseable number. Consumers treat it as "no data" rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            value: value.filter(|v| v.is_finite() && *v >= 0.0),
        }
    }

    /// Parse a raw provider value, mapping anything unusable to missing.
    pub fn parse(timestamp: DateTime<Utc>, raw: &str) -> Self {
        Self::new(timestamp, raw.trim().parse::<f64>().ok())
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_maps_bad_values_to_missing() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(SeriesPoint::parse(ts, "12").value, Some(12.0));
        assert!(SeriesPoint::parse(ts, "-9999").is_missing());
        assert!(SeriesPoint::parse(ts, "").is_missing());
        assert!(SeriesPoint::parse(ts, "NaN").is_missing());
        assert!(SeriesPoint::parse(ts, "abc").is_missing());
    }
}
