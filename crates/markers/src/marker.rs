//! The marker entity.

use std::fmt;

use map_common::{LatLng, Station};
use serde::Serialize;

use crate::display::{color_for, NEUTRAL_COLOR};

/// Identity of a marker object. Stable for the whole session once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Where a marker's value is in its data lifecycle.
///
/// A station without a marker has never been selected; markers start out
/// `Registered`. Visibility is tracked separately; hiding or re-showing a marker never
/// changes this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueState {
    /// Created and drawn in the neutral colour, no fetch queued yet
    Registered,
    /// A fetch for the active date is queued or in flight
    DataPending,
    /// A value has been applied
    DataReady,
}

/// Visual marker for one station.
#[derive(Debug, Clone)]
pub struct Marker {
    id: MarkerId,
    station: Station,
    state: ValueState,
    last_value: Option<f64>,
    daily: bool,
    stale: bool,
    visible: bool,
}

impl Marker {
    pub(crate) fn new(id: MarkerId, station: Station) -> Self {
        Self {
            id,
            station,
            state: ValueState::Registered,
            last_value: None,
            daily: false,
            stale: false,
            visible: true,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.station.code
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn state(&self) -> ValueState {
        self.state
    }

    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Neutral until a fresh value arrives for the active date.
    pub fn color(&self) -> &'static str {
        match self.last_value {
            Some(value) if !self.stale => color_for(value, self.daily),
            _ => NEUTRAL_COLOR,
        }
    }

    pub fn snapshot(&self) -> MarkerSnapshot {
        MarkerSnapshot {
            id: self.id,
            code: self.station.code.clone(),
            name: self.station.name.clone(),
            position: self.station.position(),
            state: self.state,
            value: self.last_value,
            color: self.color(),
            stale: self.stale,
            visible: self.visible,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn mark_pending(&mut self) {
        self.state = ValueState::DataPending;
    }

    pub(crate) fn apply_value(&mut self, value: f64, daily: bool) {
        self.last_value = Some(value);
        self.daily = daily;
        self.stale = false;
        self.state = ValueState::DataReady;
    }

    /// Keep the value but stop trusting it for the active date.
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Return to the last state backed by data after a fetch that produced
    /// nothing.
    pub(crate) fn settle(&mut self) {
        if self.state == ValueState::DataPending {
            self.state = if self.last_value.is_some() {
                ValueState::DataReady
            } else {
                ValueState::Registered
            };
        }
    }
}

/// Owned view of a marker handed to the UI with every event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSnapshot {
    pub id: MarkerId,
    pub code: String,
    pub name: String,
    pub position: LatLng,
    pub state: ValueState,
    pub value: Option<f64>,
    pub color: &'static str,
    pub stale: bool,
    pub visible: bool,
}
