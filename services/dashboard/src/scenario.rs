//! Headless scenario playback.
//!
//! A scenario is a list of viewport steps. Each step runs one full pass
//! of the dashboard (selection, marker fetch, weather refresh, particle
//! ticks) exactly as a map move would, and reports what happened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use declutter::Declutter;
use flow_field::driver::run_ticks;
use flow_field::{FrameDriver, ParticleEngine};
use map_common::{LatLng, MercatorViewport, PixelSize, Station, Viewport, WindSample};
use markers::{
    Clock, DataProvider, MarkerEvent, MarkerManager, MarkerSnapshot, SeriesCache, WeatherOverlay,
    WindCache,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{info, instrument, warn};

use crate::config::DashboardConfig;

const DEFAULT_SIZE: [u32; 2] = [1024, 768];
const DEFAULT_SYNTHETIC_STATIONS: usize = 1500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Seed for the synthetic provider, catalog and particles
    #[serde(default)]
    pub seed: u64,
    /// JSON station catalog; a synthetic one is generated when absent
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default = "default_synthetic_stations")]
    pub synthetic_stations: usize,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u32,
    /// `[width, height]` in pixels
    #[serde(default = "default_size")]
    pub size: [u32; 2],
    /// Particle frames to run after the data passes
    #[serde(default)]
    pub ticks: u32,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

fn default_size() -> [u32; 2] {
    DEFAULT_SIZE
}

fn default_synthetic_stations() -> usize {
    DEFAULT_SYNTHETIC_STATIONS
}

impl ScenarioStep {
    pub fn viewport(&self) -> Result<MercatorViewport> {
        let [lat, lng] = self.center;
        let [width, height] = self.size;
        MercatorViewport::new(LatLng::new(lat, lng), self.zoom, PixelSize::new(width, height))
            .with_context(|| {
                format!("Invalid viewport for step at {:?} zoom {}", self.center, self.zoom)
            })
    }
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {:?}", path))?;
        let mut scenario = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse scenario from {:?}", path))?;

        // Catalog paths are relative to the scenario file
        if let (Some(catalog), Some(dir)) = (scenario.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = dir.join(&*catalog);
            }
        }
        Ok(scenario)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.steps.is_empty(), "scenario {} has no steps", self.name);
        for (i, step) in self.steps.iter().enumerate() {
            step.viewport()
                .with_context(|| format!("scenario {} step {}", self.name, i + 1))?;
        }
        Ok(())
    }

    /// Load the configured catalog, or generate one from the seed.
    pub fn load_catalog(&self) -> Result<Vec<Station>> {
        match &self.catalog {
            Some(path) => Station::load_catalog(path)
                .with_context(|| format!("Failed to load station catalog {:?}", path)),
            None => Ok(crate::synthetic::synthetic_catalog(
                self.seed,
                self.synthetic_stations,
            )),
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepSummary {
    pub step: usize,
    pub zoom: u32,
    pub active_date: Option<NaiveDate>,
    pub selected: usize,
    pub created: usize,
    pub hidden: usize,
    pub fetched: usize,
    pub cache_hits: usize,
    pub failed: usize,
    pub events: usize,
    pub wind_samples: usize,
    pub rate_limited: bool,
    pub frames: u64,
    pub painted_pixels: usize,
    pub frame_path: Option<PathBuf>,
}

/// Owns one instance of every dashboard component and feeds them steps.
pub struct ScenarioRunner {
    catalog: Vec<Station>,
    declutter: Declutter,
    markers: MarkerManager,
    events: mpsc::UnboundedReceiver<MarkerEvent>,
    weather: WeatherOverlay,
    samples: watch::Receiver<Arc<Vec<WindSample>>>,
    engine: Arc<Mutex<ParticleEngine>>,
    driver: FrameDriver,
    realtime: bool,
    frames_dir: Option<PathBuf>,
    /// Viewport the trail canvas was last drawn for
    last_view: Option<MercatorViewport>,
    steps_run: usize,
}

impl ScenarioRunner {
    pub fn new(
        config: &DashboardConfig,
        provider: Arc<dyn DataProvider>,
        catalog: Vec<Station>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let series_cache = Arc::new(SeriesCache::new(
            config.markers.cache_capacity,
            config.markers.cache_ttl(),
        ));
        let (markers, events) = MarkerManager::with_clock(
            provider.clone(),
            series_cache,
            config.markers.lifecycle(),
            clock,
        );

        let wind_cache = Arc::new(WindCache::new(
            config.weather.cache_capacity,
            config.weather.cache_ttl(),
        ));
        let (weather, samples) =
            WeatherOverlay::new(provider, wind_cache, config.weather.overlay());

        let [width, height] = DEFAULT_SIZE;
        let engine = ParticleEngine::new(config.particles.clone(), PixelSize::new(width, height))
            .context("Failed to create particle engine")?;

        Ok(Self {
            catalog,
            declutter: Declutter::default(),
            markers,
            events,
            weather,
            samples,
            engine: Arc::new(Mutex::new(engine)),
            driver: FrameDriver::new(config.animation.frames_per_second),
            realtime: false,
            frames_dir: None,
            last_view: None,
            steps_run: 0,
        })
    }

    /// Write the trail canvas as a PNG after every step.
    pub fn with_frames_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frames_dir = Some(dir.into());
        self
    }

    /// Drive particles on the frame clock instead of back to back.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn catalog(&self) -> &[Station] {
        &self.catalog
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    pub fn engine(&self) -> &Arc<Mutex<ParticleEngine>> {
        &self.engine
    }

    pub async fn run(&mut self, scenario: &Scenario) -> Result<Vec<StepSummary>> {
        info!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            stations = self.catalog.len(),
            "Starting scenario"
        );

        let mut summaries = Vec::with_capacity(scenario.steps.len());
        for step in &scenario.steps {
            summaries.push(self.run_step(step).await?);
        }

        self.engine.lock().await.stop();
        Ok(summaries)
    }

    #[instrument(skip(self, step), fields(step = self.steps_run + 1, zoom = step.zoom))]
    pub async fn run_step(&mut self, step: &ScenarioStep) -> Result<StepSummary> {
        self.steps_run += 1;
        let viewport = step.viewport()?;

        if let Some(date) = step.date {
            if let Err(e) = self.markers.set_active_date(date).await {
                warn!(error = %e, "Keeping previous active date");
            }
        }

        let selection = self.declutter.run(&self.catalog, &viewport);
        let (reconcile, fetch) = self.markers.update(&selection).await;
        let weather = self.weather.update(&self.catalog, &viewport).await;

        let mut events = 0;
        while self.events.try_recv().is_ok() {
            events += 1;
        }

        let selected = selection.len();
        let frames = self.animate(&viewport, step.ticks).await?;

        let mut summary = StepSummary {
            step: self.steps_run,
            zoom: viewport.zoom(),
            active_date: Some(self.markers.active_date().await),
            selected,
            created: reconcile.created,
            hidden: reconcile.hidden,
            fetched: fetch.applied,
            cache_hits: fetch.cache_hits,
            failed: fetch.failed,
            events,
            wind_samples: weather.published,
            rate_limited: weather.rate_limited,
            frames,
            ..Default::default()
        };

        {
            let engine = self.engine.lock().await;
            summary.painted_pixels = engine.canvas().painted_pixels();

            if let Some(dir) = &self.frames_dir {
                let path = dir.join(format!("frame_{:03}.png", self.steps_run));
                let png = engine.canvas().encode_png().context("Failed to encode frame")?;
                tokio::fs::write(&path, png)
                    .await
                    .with_context(|| format!("Failed to write frame {:?}", path))?;
                summary.frame_path = Some(path);
            }
        }

        info!(
            selected = summary.selected,
            fetched = summary.fetched,
            wind_samples = summary.wind_samples,
            frames = summary.frames,
            "Step complete"
        );
        Ok(summary)
    }

    /// Markers currently on the map.
    pub async fn visible_markers(&self) -> Vec<MarkerSnapshot> {
        self.markers.visible_markers().await
    }

    async fn animate(&mut self, viewport: &MercatorViewport, ticks: u32) -> Result<u64> {
        let moved = self.last_view.as_ref() != Some(viewport);
        self.last_view = Some(*viewport);

        {
            let mut engine = self.engine.lock().await;
            if moved {
                engine
                    .reset_view(viewport.size())
                    .context("Failed to reset trail canvas")?;
            }
            engine.set_wind_samples(self.samples.borrow().iter().copied());
            if !engine.is_active() {
                engine.start();
            }
            if ticks == 0 {
                return Ok(0);
            }
            if !self.realtime {
                run_ticks(&mut engine, viewport, ticks);
                return Ok(u64::from(ticks));
            }
        }

        let (viewport_tx, viewport_rx) = watch::channel(*viewport);
        let driver = self.driver;
        let engine = self.engine.clone();
        let samples = self.samples.clone();
        let handle = tokio::spawn(async move { driver.run(engine, viewport_rx, samples).await });

        tokio::time::sleep(driver.frame_interval() * ticks).await;
        drop(viewport_tx);
        handle.await.context("Frame driver task failed")
    }
}
