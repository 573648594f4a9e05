//! The async data source behind markers and the wind overlay.

use async_trait::async_trait;
use chrono::NaiveDate;
use map_common::{LatLng, SeriesPoint, WindObservation};

use crate::error::ProviderError;

/// Remote source of station series and current wind.
///
/// Implementations own the network shape (URLs, CSV/JSON parsing). Values
/// that cannot be parsed should come back as missing points rather than
/// errors so one bad row does not discard a whole series.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Readings for one station between `start` and `end` (both inclusive,
    /// `YYYYMMDD` granularity).
    async fn fetch_station_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, ProviderError>;

    /// Current wind at a point, `None` when the source has no report.
    async fn fetch_wind_observation(
        &self,
        at: LatLng,
    ) -> Result<Option<WindObservation>, ProviderError>;
}
