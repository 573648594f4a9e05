//! Measurement station catalog entries.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MapError, MapResult};
use crate::geo::LatLng;

/// Level of detail tier of a station.
///
/// Level 1 stations are the most important and are shown at every zoom;
/// finer levels only appear once the map is zoomed in far enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StationLevel {
    Coarse = 1,
    Medium = 2,
    Fine = 3,
}

impl StationLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for StationLevel {
    type Error = MapError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StationLevel::Coarse),
            2 => Ok(StationLevel::Medium),
            3 => Ok(StationLevel::Fine),
            other => Err(MapError::InvalidLevel(other)),
        }
    }
}

impl From<StationLevel> for u8 {
    fn from(level: StationLevel) -> Self {
        level.as_u8()
    }
}

/// An immutable catalog entry, created once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Unique station identifier (e.g., municipality code "13101")
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub level: StationLevel,
}

impl Station {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        level: StationLevel,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            lat,
            lng,
            level,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Parse a JSON array of stations.
    ///
    /// Entries with non-finite coordinates are rejected so a bad row cannot
    /// poison distance sorting downstream.
    pub fn catalog_from_json(json: &str) -> MapResult<Vec<Station>> {
        let stations: Vec<Station> = serde_json::from_str(json)?;
        if let Some(bad) = stations.iter().find(|s| !s.position().is_finite()) {
            return Err(MapError::InvalidCoordinate(format!(
                "station {} has non-finite coordinates",
                bad.code
            )));
        }
        Ok(stations)
    }

    /// Load a JSON station catalog from disk.
    pub fn load_catalog(path: impl AsRef<Path>) -> MapResult<Vec<Station>> {
        let content = std::fs::read_to_string(path)?;
        Self::catalog_from_json(&content)
    }
}
