//! Cache key types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key for a station series request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub station_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesKey {
    pub fn new(station_code: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            station_code: station_code.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.station_code,
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}
