//! Particle advection.
//!
//! A fixed pool of particles is pushed through the interpolated wind field
//! once per tick. Each particle draws one segment per tick onto the trail
//! canvas, and the canvas fades a little before every tick, so the motion
//! reads as streaks following the wind.
//!
//! The pool is allocated once in [`ParticleEngine::new`]. Starting,
//! stopping, resizing and resetting particles all work in place.

use map_common::{PixelPoint, PixelSize, Viewport, WindSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::canvas::TrailCanvas;
use crate::config::ParticleConfig;
use crate::error::Result;
use crate::idw::IdwField;

/// One tracer in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Ticks since the last (re)spawn, always in `0..=max_age`
    pub age: u32,
}

impl Particle {
    pub fn position(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Trail segments drawn
    pub segments: usize,
    /// Particles re-spawned because they aged out or left the canvas
    pub resets: usize,
}

pub struct ParticleEngine {
    config: ParticleConfig,
    particles: Vec<Particle>,
    field: IdwField,
    canvas: TrailCanvas,
    rng: StdRng,
    active: bool,
    segments: Vec<(PixelPoint, PixelPoint)>,
    ticks: u64,
}

impl ParticleEngine {
    /// Allocate the pool and canvas. The engine starts stopped.
    pub fn new(config: ParticleConfig, size: PixelSize) -> Result<Self> {
        config.validate()?;

        let canvas = TrailCanvas::new(size)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let particles = (0..config.count)
            .map(|_| {
                let age = rng.gen_range(0..config.max_age);
                spawn(&mut rng, size, age)
            })
            .collect();

        Ok(Self {
            segments: Vec::with_capacity(config.count),
            config,
            particles,
            field: IdwField::default(),
            canvas,
            rng,
            active: false,
            ticks: 0,
        })
    }

    /// Begin scheduling ticks. Re-spawns the pool in place with staggered ages.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.respawn_all();
        debug!(particles = self.particles.len(), "Particle engine started");
    }

    /// Stop ticking and erase all trails.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.canvas.clear();
        debug!(ticks = self.ticks, "Particle engine stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Replace the wind samples the field is interpolated from.
    pub fn set_wind_samples(&mut self, samples: impl IntoIterator<Item = WindSample>) {
        self.field.set_samples(samples);
    }

    /// Rebuild the canvas for a new surface size.
    ///
    /// The pool keeps its length; when running, every particle is re-spawned
    /// inside the new bounds.
    pub fn resize(&mut self, size: PixelSize) -> Result<()> {
        if size == self.canvas.size() {
            return Ok(());
        }
        self.canvas = TrailCanvas::new(size)?;
        if self.active {
            self.respawn_all();
        }
        Ok(())
    }

    /// Start over for a new view after a pan or zoom.
    ///
    /// Trails drawn for the previous view are erased (the canvas is rebuilt
    /// if the size changed) and, when running, every particle is re-spawned
    /// in place.
    pub fn reset_view(&mut self, size: PixelSize) -> Result<()> {
        if size == self.canvas.size() {
            self.canvas.clear();
        } else {
            self.canvas = TrailCanvas::new(size)?;
        }
        if self.active {
            self.respawn_all();
        }
        Ok(())
    }

    /// Advance every particle by one step and draw its trail segment.
    ///
    /// Does nothing while stopped. The viewport supplies the zoom (for the
    /// speed scale) and the pixel to lat/lng mapping used to sample the field.
    pub fn tick<V: Viewport + ?Sized>(&mut self, viewport: &V) -> TickStats {
        if !self.active {
            return TickStats::default();
        }

        let size = self.canvas.size();
        let max_age = self.config.max_age;
        let scale = self.config.scale_for_zoom(viewport.zoom());
        let mut stats = TickStats::default();

        self.canvas.fade(self.config.fade_alpha);
        self.segments.clear();

        for particle in self.particles.iter_mut() {
            if particle.age > max_age || !size.contains(&particle.position()) {
                *particle = spawn(&mut self.rng, size, 0);
                stats.resets += 1;
            }

            let from = particle.position();
            let wind = self.field.sample(viewport.unproject(from));

            // Canvas y grows southward, wind v is northward
            particle.x += wind.u * scale;
            particle.y -= wind.v * scale;
            particle.age += 1;

            self.segments.push((from, particle.position()));

            if particle.age > max_age || !size.contains(&particle.position()) {
                *particle = spawn(&mut self.rng, size, 0);
                stats.resets += 1;
            }
        }

        self.canvas
            .stroke_segments(&self.segments, self.config.opacity, self.config.line_width);
        stats.segments = self.segments.len();
        self.ticks += 1;
        stats
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn canvas(&self) -> &TrailCanvas {
        &self.canvas
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn field(&self) -> &IdwField {
        &self.field
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn respawn_all(&mut self) {
        let size = self.canvas.size();
        let max_age = self.config.max_age;
        for particle in self.particles.iter_mut() {
            let age = self.rng.gen_range(0..max_age);
            *particle = spawn(&mut self.rng, size, age);
        }
    }
}

fn spawn(rng: &mut StdRng, size: PixelSize, age: u32) -> Particle {
    Particle {
        x: rng.gen_range(0.0..size.width as f64),
        y: rng.gen_range(0.0..size.height as f64),
        age,
    }
}
