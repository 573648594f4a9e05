//! Active-date arithmetic, display values and marker colours.
//!
//! Dates are Japan Standard Time (UTC+9, no DST). "Today" decides both the
//! request range and how a series collapses to one number: the latest
//! hourly reading for today, the daily total for any past date.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use map_common::SeriesPoint;

/// Fill colour of a marker that has no current value.
pub const NEUTRAL_COLOR: &str = "#CCCCCC";

const VERY_HIGH: &str = "#9C27B0";
const HIGH: &str = "#f44336";
const MEDIUM: &str = "#FFEB3B";
const LOW: &str = "#2196F3";
const NONE: &str = "#FFFFFF";

/// Lower bounds for very high, high, medium and low.
const HOURLY_THRESHOLDS: [f64; 4] = [12.0, 7.0, 4.0, 1.0];
const DAILY_THRESHOLDS: [f64; 4] = [300.0, 150.0, 90.0, 30.0];

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Source of the current instant, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        jst_date(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar date of `instant` in Japan.
pub fn jst_date(instant: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => instant.with_timezone(&jst).date_naive(),
        None => (instant + Duration::seconds(JST_OFFSET_SECS as i64)).date_naive(),
    }
}

/// Request range for `date`: the day itself through the next day, never
/// past today.
pub fn date_range(date: NaiveDate, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let next = date.succ_opt().unwrap_or(date);
    (date, next.min(today))
}

/// Collapse a series into the number shown on the marker.
///
/// For today: the latest non-missing reading not in the future, 0 when
/// there is none. For a past date: the sum of that day's readings with
/// missing ones counted as 0.
pub fn display_value(points: &[SeriesPoint], date: NaiveDate, now: DateTime<Utc>) -> f64 {
    if date == jst_date(now) {
        points
            .iter()
            .filter(|p| p.timestamp <= now)
            .filter_map(|p| p.value.map(|v| (p.timestamp, v)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, v)| v)
            .unwrap_or(0.0)
    } else {
        points
            .iter()
            .filter(|p| jst_date(p.timestamp) == date)
            .map(|p| p.value.unwrap_or(0.0))
            .sum()
    }
}

/// Marker colour for a display value. `daily` selects the daily-total scale.
pub fn color_for(value: f64, daily: bool) -> &'static str {
    let thresholds = if daily {
        &DAILY_THRESHOLDS
    } else {
        &HOURLY_THRESHOLDS
    };
    let colors = [VERY_HIGH, HIGH, MEDIUM, LOW];

    thresholds
        .iter()
        .zip(colors)
        .find(|(threshold, _)| value >= **threshold)
        .map(|(_, color)| color)
        .unwrap_or(NONE)
}
