//! Station markers and the data that feeds them.
//!
//! - [`lifecycle`]: reconciles markers with each new selection and fetches
//!   series data for newly visible stations in bounded batches
//! - [`weather`]: fetches wind observations for the overlay and publishes
//!   them as [`WindSample`](map_common::WindSample)s
//! - [`display`]: active-date handling, display values and marker colours
//! - [`provider`]: the async data source both of the above consume

pub mod display;
pub mod error;
pub mod lifecycle;
pub mod marker;
pub mod provider;
pub mod weather;

pub use display::{
    color_for, date_range, display_value, jst_date, Clock, FixedClock, SystemClock, NEUTRAL_COLOR,
};
pub use error::{MarkerError, ProviderError, Result};
pub use lifecycle::{
    FetchReport, LifecycleConfig, MarkerEvent, MarkerManager, ReconcileReport, SeriesCache,
    DEFAULT_BATCH_SIZE,
};
pub use marker::{Marker, MarkerId, MarkerSnapshot, ValueState};
pub use provider::DataProvider;
pub use weather::{station_budget, WeatherConfig, WeatherOverlay, WeatherReport, WindCache};
