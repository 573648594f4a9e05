//! Wind observations for the particle overlay.
//!
//! The overlay picks a small, zoom-dependent number of stations nearest
//! the view center (with its own level-of-detail thresholds), fetches
//! current wind for the ones not cached, and republishes every cached
//! observation as [`WindSample`]s after each batch. The particle engine
//! consumes the published set through a watch channel.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use declutter::{filter_candidates, LevelThresholds};
use futures::future::join_all;
use map_common::{Station, Viewport, WindSample};
use metrics::counter;
use serde::{Deserialize, Serialize};
use storage::TtlCache;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::{MarkerError, ProviderError, Result};
use crate::provider::DataProvider;

/// Wind samples cached by station code.
pub type WindCache = TtlCache<String, WindSample>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Observations requested together (default: 50)
    pub batch_size: usize,
    /// Pause between batches in milliseconds (default: 500)
    pub batch_pause_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_pause_ms: 500,
        }
    }
}

impl WeatherConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MarkerError::InvalidConfig(
                "weather batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one overlay refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReport {
    /// Stations within budget for this view
    pub targeted: usize,
    /// Targets already cached
    pub cached: usize,
    /// New samples stored
    pub fetched: usize,
    pub failed: usize,
    pub batches: usize,
    /// A batch hit the upstream rate limit and the rest were skipped
    pub rate_limited: bool,
    /// Size of the last published sample set
    pub published: usize,
}

/// How many stations feed the wind field at `zoom`.
pub fn station_budget(zoom: u32) -> usize {
    match zoom {
        0..=6 => 6,
        7..=8 => 12,
        9 => 20,
        10 => 35,
        _ => 50,
    }
}

pub struct WeatherOverlay {
    provider: Arc<dyn DataProvider>,
    cache: Arc<WindCache>,
    config: WeatherConfig,
    thresholds: LevelThresholds,
    pending: Mutex<HashSet<String>>,
    samples: watch::Sender<Arc<Vec<WindSample>>>,
}

impl WeatherOverlay {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        cache: Arc<WindCache>,
        mut config: WeatherConfig,
    ) -> (Self, watch::Receiver<Arc<Vec<WindSample>>>) {
        config.batch_size = config.batch_size.max(1);
        let (samples, rx) = watch::channel(Arc::new(Vec::new()));
        let overlay = Self {
            provider,
            cache,
            config,
            thresholds: LevelThresholds::WEATHER,
            pending: Mutex::new(HashSet::new()),
            samples,
        };
        (overlay, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<WindSample>>> {
        self.samples.subscribe()
    }

    /// Stations to observe for this view, nearest the center first.
    pub fn targets<'a, V: Viewport + ?Sized>(
        &self,
        catalog: &'a [Station],
        viewport: &V,
    ) -> Vec<&'a Station> {
        let zoom = viewport.zoom();
        filter_candidates(
            catalog,
            &viewport.bounds(),
            viewport.center(),
            zoom,
            &self.thresholds,
        )
        .into_iter()
        .take(station_budget(zoom))
        .map(|c| c.station)
        .collect()
    }

    /// Refresh observations for the view and publish the resulting samples.
    pub async fn update<V: Viewport + ?Sized>(
        &self,
        catalog: &[Station],
        viewport: &V,
    ) -> WeatherReport {
        let targets = self.targets(catalog, viewport);
        let mut report = WeatherReport {
            targeted: targets.len(),
            ..Default::default()
        };

        let mut uncached = Vec::new();
        {
            let pending = self.pending.lock().await;
            for station in targets {
                if self.cache.get(&station.code).await.is_some() {
                    report.cached += 1;
                } else if !pending.contains(&station.code) {
                    uncached.push(station);
                }
            }
        }

        report.published = self.publish().await;

        let batch_count = uncached.len().div_ceil(self.config.batch_size);
        for (index, batch) in uncached.chunks(self.config.batch_size).enumerate() {
            {
                let mut pending = self.pending.lock().await;
                pending.extend(batch.iter().map(|s| s.code.clone()));
            }

            report.batches += 1;
            debug!(batch = index + 1, size = batch.len(), "Fetching wind batch");

            let results = join_all(
                batch
                    .iter()
                    .map(|s| self.provider.fetch_wind_observation(s.position())),
            )
            .await;

            for (station, result) in batch.iter().zip(results) {
                match result {
                    Ok(Some(obs)) => {
                        let sample = WindSample::from_observation(station.position(), &obs);
                        if let Some(sample) = sample {
                            self.cache.insert(station.code.clone(), sample).await;
                            report.fetched += 1;
                        }
                    }
                    Ok(None) => {}
                    Err(ProviderError::RateLimited) => {
                        report.rate_limited = true;
                    }
                    Err(e) => {
                        counter!("dashboard_fetch_total", "outcome" => "wind_error").increment(1);
                        warn!(station = %station.code, error = %e, "Wind fetch failed");
                        report.failed += 1;
                    }
                }
            }

            {
                let mut pending = self.pending.lock().await;
                for station in batch {
                    pending.remove(&station.code);
                }
            }

            report.published = self.publish().await;

            if report.rate_limited {
                counter!("dashboard_fetch_total", "outcome" => "rate_limited").increment(1);
                warn!(
                    skipped_batches = batch_count - index - 1,
                    "Wind provider rate limited, stopping this pass"
                );
                break;
            }

            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_pause()).await;
            }
        }

        info!(
            zoom = viewport.zoom(),
            targeted = report.targeted,
            cached = report.cached,
            fetched = report.fetched,
            published = report.published,
            "Weather overlay refreshed"
        );
        report
    }

    /// Send every unexpired cached sample to subscribers.
    pub async fn publish(&self) -> usize {
        let samples = self.cache.values().await;
        let count = samples.len();
        self.samples.send_replace(Arc::new(samples));
        count
    }
}
