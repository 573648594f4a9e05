//! `DataProvider` backed by the public HTTP endpoints.
//!
//! Series come back as CSV (`code,date,value` with a header row); current
//! wind comes back as JSON from an Open-Meteo style forecast endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use map_common::{LatLng, SeriesPoint, WindObservation};
use markers::{DataProvider, ProviderError};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ProviderSection;

pub struct HttpDataProvider {
    client: Client,
    series_endpoint: String,
    weather_endpoint: String,
}

impl HttpDataProvider {
    pub fn new(config: &ProviderSection) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("station-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            series_endpoint: config.series_endpoint.clone(),
            weather_endpoint: config.weather_endpoint.clone(),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl DataProvider for HttpDataProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_station_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let query = [
            ("citycode", code.to_string()),
            ("start", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
        ];
        let body = self
            .get(&self.series_endpoint, &query)
            .await?
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let points = parse_series_csv(&body);
        debug!(code, points = points.len(), "Series fetched");
        Ok(points)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_wind_observation(
        &self,
        at: LatLng,
    ) -> Result<Option<WindObservation>, ProviderError> {
        let query = [
            ("latitude", format!("{:.4}", at.lat)),
            ("longitude", format!("{:.4}", at.lng)),
            ("current", "wind_speed_10m,wind_direction_10m".to_string()),
            ("windspeed_unit", "ms".to_string()),
            ("timezone", "Asia/Tokyo".to_string()),
        ];
        let body = self
            .get(&self.weather_endpoint, &query)
            .await?
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        parse_current_wind(&body)
    }
}

/// Parse a series CSV body.
///
/// The first line is a header. Rows whose timestamp does not parse are
/// dropped; unusable values become missing readings.
pub fn parse_series_csv(body: &str) -> Vec<SeriesPoint> {
    body.trim()
        .lines()
        .skip(1)
        .filter_map(|row| {
            let mut fields = row.split(',');
            let _code = fields.next()?;
            let date = fields.next()?.trim();
            let value = fields.next().unwrap_or("");
            let timestamp = DateTime::parse_from_rfc3339(date)
                .map(|ts| ts.with_timezone(&Utc))
                .ok()?;
            Some(SeriesPoint::parse(timestamp, value))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

/// Parse the `current` block of a forecast response.
///
/// A response without wind fields is "no observation", not an error.
pub fn parse_current_wind(body: &str) -> Result<Option<WindObservation>, ProviderError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    Ok(response.current.and_then(|c| {
        Some(WindObservation {
            speed: c.wind_speed_10m?,
            direction_deg: c.wind_direction_10m?,
        })
    }))
}
