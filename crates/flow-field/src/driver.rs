//! Repeating frame callback.
//!
//! The driver ticks the engine at a fixed frame rate. It does not measure
//! elapsed time: a late frame is skipped rather than doubled, so apparent
//! particle speed depends on the frame rate just like a display-refresh
//! callback would.

use std::sync::Arc;
use std::time::Duration;

use map_common::{Viewport, WindSample};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::engine::{ParticleEngine, TickStats};

/// Default display refresh rate.
pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub struct FrameDriver {
    frames_per_second: u32,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FrameDriver {
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            frames_per_second: frames_per_second.max(1),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frames_per_second
    }

    /// Tick `engine` every frame until the viewport sender is dropped.
    ///
    /// Viewport and wind-sample updates are applied under the engine lock
    /// right before the tick, so a tick never sees half of an update. A new
    /// viewport value resets the view: trails are erased and particles are
    /// re-spawned, even when the surface size did not change.
    /// Returns the number of frames driven.
    pub async fn run<V>(
        &self,
        engine: Arc<Mutex<ParticleEngine>>,
        mut viewport: watch::Receiver<V>,
        mut samples: watch::Receiver<Arc<Vec<WindSample>>>,
    ) -> u64
    where
        V: Viewport + Clone,
    {
        let mut ticker = interval(self.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = 0u64;
        let mut current = viewport.borrow_and_update().clone();

        loop {
            ticker.tick().await;

            let moved = match viewport.has_changed() {
                Ok(true) => {
                    current = viewport.borrow_and_update().clone();
                    true
                }
                Ok(false) => false,
                Err(_) => break,
            };

            let new_samples = match samples.has_changed() {
                Ok(true) => Some(samples.borrow_and_update().clone()),
                _ => None,
            };

            let mut engine = engine.lock().await;
            if let Some(new_samples) = new_samples {
                debug!(samples = new_samples.len(), "Applying wind samples");
                engine.set_wind_samples(new_samples.iter().copied());
            }
            let applied = if moved {
                engine.reset_view(current.size())
            } else {
                engine.resize(current.size())
            };
            if let Err(e) = applied {
                warn!(error = %e, "Failed to resize trail canvas");
                continue;
            }
            engine.tick(&current);
            frames += 1;
        }

        debug!(frames, "Frame driver stopped");
        frames
    }
}

/// Run `ticks` frames back to back without waiting, summing their stats.
pub fn run_ticks<V: Viewport + ?Sized>(
    engine: &mut ParticleEngine,
    viewport: &V,
    ticks: u32,
) -> TickStats {
    let mut total = TickStats::default();
    for _ in 0..ticks {
        let stats = engine.tick(viewport);
        total.segments += stats.segments;
        total.resets += stats.resets;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;
    use map_common::{LatLng, MercatorViewport, PixelSize};

    fn viewport(width: u32) -> MercatorViewport {
        MercatorViewport::new(LatLng::new(35.0, 139.0), 6, PixelSize::new(width, 120)).unwrap()
    }

    fn engine() -> Arc<Mutex<ParticleEngine>> {
        let config = ParticleConfig {
            count: 50,
            seed: Some(1),
            ..Default::default()
        };
        let mut engine = ParticleEngine::new(config, PixelSize::new(160, 120)).unwrap();
        engine.start();
        Arc::new(Mutex::new(engine))
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(FrameDriver::new(50).frame_interval(), Duration::from_millis(20));
        assert_eq!(FrameDriver::new(0).frame_interval(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_viewport_sender_dropped() {
        let engine = engine();
        let (view_tx, view_rx) = watch::channel(viewport(160));
        let (_samples_tx, samples_rx) = watch::channel(Arc::new(Vec::new()));

        let driver = FrameDriver::new(50);
        let handle = tokio::spawn({
            let engine = engine.clone();
            async move { driver.run(engine, view_rx, samples_rx).await }
        });

        tokio::time::sleep(Duration::from_millis(110)).await;
        drop(view_tx);
        let frames = handle.await.unwrap();

        assert!(frames >= 5, "expected at least 5 frames, got {}", frames);
        assert_eq!(engine.lock().await.ticks(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn test_applies_viewport_and_samples() {
        let engine = engine();
        let (view_tx, view_rx) = watch::channel(viewport(160));
        let (samples_tx, samples_rx) = watch::channel(Arc::new(Vec::new()));

        let handle = tokio::spawn({
            let engine = engine.clone();
            async move { FrameDriver::new(50).run(engine, view_rx, samples_rx).await }
        });

        view_tx.send(viewport(80)).unwrap();
        samples_tx
            .send(Arc::new(vec![WindSample {
                lat: 35.0,
                lng: 139.0,
                u: 2.0,
                v: 1.0,
            }]))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(view_tx);
        handle.await.unwrap();

        let engine = engine.lock().await;
        assert_eq!(engine.canvas().size(), PixelSize::new(80, 120));
        assert_eq!(engine.field().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pan_at_same_size_respawns_particles() {
        let config = ParticleConfig {
            count: 50,
            max_age: 1000,
            seed: Some(5),
            ..Default::default()
        };
        let mut engine = ParticleEngine::new(config, PixelSize::new(160, 120)).unwrap();
        engine.start();
        let engine = Arc::new(Mutex::new(engine));

        let (view_tx, view_rx) = watch::channel(viewport(160));
        let (_samples_tx, samples_rx) = watch::channel(Arc::new(Vec::new()));
        let handle = tokio::spawn({
            let engine = engine.clone();
            async move { FrameDriver::new(50).run(engine, view_rx, samples_rx).await }
        });

        let positions = |e: &ParticleEngine| -> Vec<(f64, f64)> {
            e.particles().iter().map(|p| (p.x, p.y)).collect()
        };
        let changed = |a: &[(f64, f64)], b: &[(f64, f64)]| {
            a.iter().zip(b).filter(|(a, b)| a != b).count()
        };

        // No wind: particles stay put while the view is unchanged
        let before = positions(&*engine.lock().await);
        tokio::time::sleep(Duration::from_millis(70)).await;
        let still = positions(&*engine.lock().await);
        assert!(changed(&before, &still) <= 5);

        let panned = viewport(160).with_center(LatLng::new(34.7, 135.5)).unwrap();
        view_tx.send(panned).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after = positions(&*engine.lock().await);
        assert!(changed(&still, &after) >= 45);

        drop(view_tx);
        handle.await.unwrap();
        assert_eq!(engine.lock().await.canvas().size(), PixelSize::new(160, 120));
    }

    #[test]
    fn test_run_ticks_sums_stats() {
        let config = ParticleConfig {
            count: 20,
            seed: Some(3),
            ..Default::default()
        };
        let mut engine = ParticleEngine::new(config, PixelSize::new(160, 120)).unwrap();
        engine.start();
        let stats = run_ticks(&mut engine, &viewport(160), 4);
        assert_eq!(stats.segments, 80);
        assert_eq!(engine.ticks(), 4);
    }
}
