//! Station dashboard CLI
//!
//! Plays back viewport scenarios headlessly or prints the marker selection
//! for a single view.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use declutter::Declutter;
use map_common::{LatLng, MercatorViewport, PixelSize, Station};
use markers::{DataProvider, MarkerManager, SeriesCache, SystemClock};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard::report::RunReport;
use dashboard::synthetic::synthetic_catalog;
use dashboard::{DashboardConfig, HttpDataProvider, Scenario, ScenarioRunner, SyntheticProvider};

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Station marker selection and wind particle playback")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "DASHBOARD_LOG_JSON")]
    log_json: bool,

    /// Use the synthetic provider instead of the network
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play back a scenario file
    Simulate {
        /// Scenario YAML
        scenario: PathBuf,

        /// Station catalog JSON (overrides the scenario's)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Write a PNG of the trail canvas after each step
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Particle seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Run particle frames on the wall clock
        #[arg(long)]
        realtime: bool,

        /// Print step summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the markers selected for one view
    Select {
        /// Map center as "lat,lng"
        #[arg(long, default_value = "36.5,138.0")]
        center: String,

        #[arg(long, default_value_t = 5)]
        zoom: u32,

        #[arg(long, default_value_t = 1024)]
        width: u32,

        #[arg(long, default_value_t = 768)]
        height: u32,

        /// Station catalog JSON; a synthetic catalog is used when absent
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Fetch values for the selected markers
        #[arg(long)]
        fetch: bool,

        /// Rows to print
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if cli.offline {
        config.provider.offline = true;
    }

    match cli.command {
        Command::Simulate {
            scenario,
            catalog,
            frames_dir,
            seed,
            realtime,
            json,
        } => {
            let mut scenario = Scenario::from_file(&scenario)?;
            if catalog.is_some() {
                scenario.catalog = catalog;
            }
            if let Some(seed) = seed {
                config.particles.seed = Some(seed);
            }
            config.validate()?;

            let provider = build_provider(&config, scenario.seed)?;
            let stations = scenario.load_catalog()?;
            let mut runner =
                ScenarioRunner::new(&config, provider, stations, Arc::new(SystemClock))?
                    .realtime(realtime);
            if let Some(dir) = frames_dir {
                tokio::fs::create_dir_all(&dir)
                    .await
                    .with_context(|| format!("Failed to create frames directory {:?}", dir))?;
                runner = runner.with_frames_dir(dir);
            }

            let summaries = runner.run(&scenario).await?;
            if json {
                println!("{}", RunReport::format_json(&summaries)?);
            } else {
                println!("{}", RunReport::format_steps(&scenario.name, &summaries));
            }
        }

        Command::Select {
            center,
            zoom,
            width,
            height,
            catalog,
            fetch,
            limit,
        } => {
            let center = parse_center(&center)?;
            let viewport = MercatorViewport::new(center, zoom, PixelSize::new(width, height))?;
            let stations = match catalog {
                Some(path) => Station::load_catalog(&path)
                    .with_context(|| format!("Failed to load station catalog {:?}", path))?,
                None => synthetic_catalog(0, 1500),
            };

            let selection = Declutter::default().run(&stations, &viewport);
            info!(
                stations = stations.len(),
                selected = selection.len(),
                zoom,
                "Selection complete"
            );

            let provider = build_provider(&config, 0)?;
            let cache = Arc::new(SeriesCache::new(
                config.markers.cache_capacity,
                config.markers.cache_ttl(),
            ));
            let (manager, _events) =
                MarkerManager::new(provider, cache, config.markers.lifecycle());
            if fetch {
                manager.update(&selection).await;
            } else {
                manager.reconcile(&selection).await;
            }

            let mut rows = Vec::with_capacity(limit.min(selection.len()));
            for station in selection.iter().take(limit) {
                if let Some(snapshot) = manager.marker(&station.code).await {
                    rows.push(snapshot);
                }
            }
            println!("{}", RunReport::format_markers(&rows));
            println!("{} of {} stations selected", selection.len(), stations.len());
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_provider(config: &DashboardConfig, seed: u64) -> Result<Arc<dyn DataProvider>> {
    if config.provider.offline {
        info!(seed, "Using synthetic data provider");
        Ok(Arc::new(SyntheticProvider::new(seed)))
    } else {
        info!(
            series = %config.provider.series_endpoint,
            weather = %config.provider.weather_endpoint,
            "Using HTTP data provider"
        );
        Ok(Arc::new(HttpDataProvider::new(&config.provider)?))
    }
}

fn parse_center(s: &str) -> Result<LatLng> {
    let (lat, lng) = s
        .split_once(',')
        .with_context(|| format!("Invalid center {:?}, expected \"lat,lng\"", s))?;
    let lat: f64 = lat.trim().parse().context("Invalid latitude")?;
    let lng: f64 = lng.trim().parse().context("Invalid longitude")?;
    Ok(LatLng::new(lat, lng))
}
