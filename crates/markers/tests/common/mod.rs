//! Shared helpers for markers integration tests.
//!
//! Provides a scripted in-memory provider that counts calls, can delay
//! responses to keep requests in flight, and tracks peak concurrency.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use map_common::{LatLng, SeriesPoint, WindObservation};
use markers::{DataProvider, FixedClock, ProviderError};

/// 2025-03-01 15:00 JST.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 6, 0, 0).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock(now())
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

pub fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
}

/// Hourly readings for Feb 28 and Mar 1 (JST): 2.0 per hour on the 28th,
/// then 5.0 up to the current hour on the 1st.
pub fn two_day_series() -> Vec<SeriesPoint> {
    let start = Utc.with_ymd_and_hms(2025, 2, 27, 15, 0, 0).unwrap();
    (0..48)
        .map(|h| {
            let ts = start + chrono::Duration::hours(h);
            let value = if h < 24 { 2.0 } else { 5.0 };
            SeriesPoint::new(ts, Some(value))
        })
        .collect()
}

pub struct ScriptedProvider {
    series: Vec<SeriesPoint>,
    failures: Mutex<HashMap<String, ProviderError>>,
    delay: Option<Duration>,
    wind: Option<WindObservation>,
    wind_limit: Option<usize>,

    series_calls: Mutex<HashMap<String, usize>>,
    wind_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(series: Vec<SeriesPoint>) -> Self {
        Self {
            series,
            failures: Mutex::new(HashMap::new()),
            delay: None,
            wind: Some(WindObservation {
                speed: 5.0,
                direction_deg: 270.0,
            }),
            wind_limit: None,
            series_calls: Mutex::new(HashMap::new()),
            wind_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold every response for `delay` (tokio time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `RateLimited` once `limit` wind requests have succeeded.
    pub fn with_wind_limit(mut self, limit: usize) -> Self {
        self.wind_limit = Some(limit);
        self
    }

    pub fn without_wind(mut self) -> Self {
        self.wind = None;
        self
    }

    pub fn fail(&self, code: &str, error: ProviderError) {
        self.failures.lock().unwrap().insert(code.to_string(), error);
    }

    pub fn recover(&self, code: &str) {
        self.failures.lock().unwrap().remove(code);
    }

    pub fn series_calls(&self) -> usize {
        self.series_calls.lock().unwrap().values().sum()
    }

    pub fn series_calls_for(&self, code: &str) -> usize {
        self.series_calls.lock().unwrap().get(code).copied().unwrap_or(0)
    }

    pub fn wind_calls(&self) -> usize {
        self.wind_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    async fn fetch_station_series(
        &self,
        code: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        *self
            .series_calls
            .lock()
            .unwrap()
            .entry(code.to_string())
            .or_insert(0) += 1;
        self.enter().await;

        if let Some(error) = self.failures.lock().unwrap().get(code) {
            return Err(error.clone());
        }
        Ok(self.series.clone())
    }

    async fn fetch_wind_observation(
        &self,
        _at: LatLng,
    ) -> Result<Option<WindObservation>, ProviderError> {
        let call = self.wind_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;

        if let Some(limit) = self.wind_limit {
            if call >= limit {
                return Err(ProviderError::RateLimited);
            }
        }
        Ok(self.wind)
    }
}
