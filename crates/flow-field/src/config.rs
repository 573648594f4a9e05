//! Particle animation settings.

use serde::{Deserialize, Serialize};

use crate::error::{FlowFieldError, Result};

/// Fixed-at-construction settings of the particle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Pool size (default: 1500)
    pub count: usize,
    /// Ticks a particle lives before re-spawning (default: 60)
    pub max_age: u32,
    /// Pixels per tick per unit of wind speed at zoom 5 (default: 0.01)
    pub velocity_scale: f64,
    /// Alpha of newly drawn trail segments (default: 0.7)
    pub opacity: f32,
    /// Trail stroke width in pixels (default: 1.2)
    pub line_width: f32,
    /// Alpha of the destination-in fade applied before each tick (default: 0.95)
    pub fade_alpha: f32,
    /// RNG seed for reproducible spawns; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1500,
            max_age: 60,
            velocity_scale: 0.01,
            opacity: 0.7,
            line_width: 1.2,
            fade_alpha: 0.95,
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// Pixel displacement per unit of wind per tick at `zoom`.
    ///
    /// Doubles with every zoom level: `velocity_scale * 2^(zoom - 5)`.
    pub fn scale_for_zoom(&self, zoom: u32) -> f64 {
        self.velocity_scale * 2f64.powi(zoom as i32 - 5)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(FlowFieldError::invalid_config("count must be positive"));
        }
        if self.max_age == 0 {
            return Err(FlowFieldError::invalid_config("max_age must be positive"));
        }
        if !(self.velocity_scale.is_finite() && self.velocity_scale > 0.0) {
            return Err(FlowFieldError::invalid_config(format!(
                "velocity_scale must be positive, got {}",
                self.velocity_scale
            )));
        }
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(FlowFieldError::invalid_config(format!(
                "opacity must be in (0, 1], got {}",
                self.opacity
            )));
        }
        if !(self.fade_alpha > 0.0 && self.fade_alpha <= 1.0) {
            return Err(FlowFieldError::invalid_config(format!(
                "fade_alpha must be in (0, 1], got {}",
                self.fade_alpha
            )));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(FlowFieldError::invalid_config("line_width must be positive"));
        }
        Ok(())
    }
}
