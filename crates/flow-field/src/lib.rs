//! Wind flow visualization.
//!
//! Turns a sparse set of wind samples into an animated particle field:
//! - [`idw`]: inverse-distance-weighted vector field over scattered samples
//! - [`engine`]: fixed particle pool advected through the field every tick
//! - [`canvas`]: trail surface that fades by re-compositing instead of clearing
//! - [`driver`]: repeating frame callback that ticks the engine
//! - [`png`]: PNG encoding for exported frames

pub mod canvas;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod idw;
pub mod png;

pub use canvas::TrailCanvas;
pub use config::ParticleConfig;
pub use driver::FrameDriver;
pub use engine::{Particle, ParticleEngine, TickStats};
pub use error::{FlowFieldError, Result};
pub use idw::{IdwField, WindVector, IDW_EPSILON};
