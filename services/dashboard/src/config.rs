//! Dashboard configuration.
//!
//! Layered: YAML file (with `${VAR}` / `${VAR:-default}` substitution),
//! then `DASHBOARD_*` environment variables, then CLI flags applied by
//! `main`. Every field has a default, so an empty file is a valid config.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use flow_field::ParticleConfig;
use markers::{LifecycleConfig, WeatherConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub provider: ProviderSection,
    pub markers: MarkersSection,
    pub weather: WeatherSection,
    pub particles: ParticleConfig,
    pub animation: AnimationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// CSV series endpoint, queried with `citycode`, `start` and `end`
    pub series_endpoint: String,
    /// JSON current-weather endpoint, queried with `latitude`/`longitude`
    pub weather_endpoint: String,
    pub timeout_secs: u64,
    /// Use the synthetic provider instead of the network
    pub offline: bool,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            series_endpoint: "https://wxtech.weathernews.com/opendata/v1/pollen".to_string(),
            weather_endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_secs: 10,
            offline: false,
        }
    }
}

impl ProviderSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersSection {
    pub batch_size: usize,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for MarkersSection {
    fn default() -> Self {
        Self {
            batch_size: markers::DEFAULT_BATCH_SIZE,
            cache_ttl_secs: 600,
            cache_capacity: 5000,
        }
    }
}

impl MarkersSection {
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            batch_size: self.batch_size,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub batch_size: usize,
    pub batch_pause_ms: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for WeatherSection {
    fn default() -> Self {
        let overlay = WeatherConfig::default();
        Self {
            batch_size: overlay.batch_size,
            batch_pause_ms: overlay.batch_pause_ms,
            cache_ttl_secs: 600,
            cache_capacity: 1000,
        }
    }
}

impl WeatherSection {
    pub fn overlay(&self) -> WeatherConfig {
        WeatherConfig {
            batch_size: self.batch_size,
            batch_pause_ms: self.batch_pause_ms,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSection {
    pub frames_per_second: u32,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
        }
    }
}

impl DashboardConfig {
    /// Load from a YAML file, or start from defaults when `path` is `None`,
    /// then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config from {:?}", path))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse dashboard config from {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Override fields from `DASHBOARD_*` variables found by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DASHBOARD_SERIES_ENDPOINT") {
            self.provider.series_endpoint = v;
        }
        if let Some(v) = lookup("DASHBOARD_WEATHER_ENDPOINT") {
            self.provider.weather_endpoint = v;
        }
        override_parsed(&lookup, "DASHBOARD_TIMEOUT_SECS", &mut self.provider.timeout_secs)?;
        override_parsed(&lookup, "DASHBOARD_OFFLINE", &mut self.provider.offline)?;
        override_parsed(&lookup, "DASHBOARD_MARKER_BATCH_SIZE", &mut self.markers.batch_size)?;
        override_parsed(
            &lookup,
            "DASHBOARD_MARKER_CACHE_TTL_SECS",
            &mut self.markers.cache_ttl_secs,
        )?;
        override_parsed(&lookup, "DASHBOARD_WEATHER_BATCH_SIZE", &mut self.weather.batch_size)?;
        override_parsed(
            &lookup,
            "DASHBOARD_WEATHER_BATCH_PAUSE_MS",
            &mut self.weather.batch_pause_ms,
        )?;
        override_parsed(
            &lookup,
            "DASHBOARD_WEATHER_CACHE_TTL_SECS",
            &mut self.weather.cache_ttl_secs,
        )?;
        override_parsed(&lookup, "DASHBOARD_PARTICLE_COUNT", &mut self.particles.count)?;
        override_parsed(&lookup, "DASHBOARD_FPS", &mut self.animation.frames_per_second)?;

        if let Some(v) = lookup("DASHBOARD_PARTICLE_SEED") {
            let seed = v
                .parse()
                .with_context(|| format!("DASHBOARD_PARTICLE_SEED: invalid value {:?}", v))?;
            self.particles.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.provider.timeout_secs > 0,
            "provider.timeout_secs must be positive"
        );
        self.markers
            .lifecycle()
            .validate()
            .context("Invalid markers section")?;
        self.weather
            .overlay()
            .validate()
            .context("Invalid weather section")?;
        anyhow::ensure!(
            self.markers.cache_capacity > 0 && self.weather.cache_capacity > 0,
            "cache capacities must be positive"
        );
        anyhow::ensure!(
            self.animation.frames_per_second > 0,
            "animation.frames_per_second must be positive"
        );
        self.particles
            .validate()
            .context("Invalid particles section")?;
        debug!("Dashboard configuration validated");
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}: invalid value {:?}: {}", key, raw, e))?;
    }
    Ok(())
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        result.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }
    result.push_str(rest);

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((name, default)) = expr.split_once(":-") {
        match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
