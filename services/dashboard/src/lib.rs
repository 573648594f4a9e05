//! Station dashboard service.
//!
//! Wires the selector, marker lifecycle, weather overlay and particle
//! engine together behind a CLI. Data comes either from the public HTTP
//! endpoints or, offline, from a deterministic synthetic provider.

pub mod config;
pub mod http_provider;
pub mod report;
pub mod scenario;
pub mod synthetic;

pub use config::DashboardConfig;
pub use http_provider::HttpDataProvider;
pub use scenario::{Scenario, ScenarioRunner, ScenarioStep, StepSummary};
pub use synthetic::SyntheticProvider;
