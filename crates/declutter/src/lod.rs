//! Level-of-detail gating by zoom.

use map_common::StationLevel;
use serde::{Deserialize, Serialize};

/// Zoom levels at which finer station tiers become visible.
///
/// Level 1 stations are always eligible. The marker pipeline and the
/// weather overlay are tuned independently, so each owns its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThresholds {
    /// Minimum zoom at which level 2 stations are shown
    pub medium_from_zoom: u32,
    /// Minimum zoom at which level 3 stations are shown
    pub fine_from_zoom: u32,
}

impl LevelThresholds {
    /// Thresholds for the station marker pipeline.
    pub const MARKERS: LevelThresholds = LevelThresholds {
        medium_from_zoom: 6,
        fine_from_zoom: 8,
    };

    /// Thresholds for the weather/particle overlay.
    pub const WEATHER: LevelThresholds = LevelThresholds {
        medium_from_zoom: 8,
        fine_from_zoom: 10,
    };

    /// Levels enabled at `zoom`.
    pub fn levels_at(&self, zoom: u32) -> LevelSet {
        LevelSet {
            medium: zoom >= self.medium_from_zoom,
            fine: zoom >= self.fine_from_zoom,
        }
    }
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self::MARKERS
    }
}

/// The set of station levels active for one selection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet {
    medium: bool,
    fine: bool,
}

impl LevelSet {
    pub fn contains(&self, level: StationLevel) -> bool {
        match level {
            StationLevel::Coarse => true,
            StationLevel::Medium => self.medium,
            StationLevel::Fine => self.fine,
        }
    }
}
