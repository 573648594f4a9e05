//! Zoom-dependent density parameters.
//!
//! These numbers define how crowded the map is allowed to look, so they are
//! reproduced exactly rather than derived:
//!
//! | zoom   | max markers | spacing at center | spacing at corner |
//! |--------|-------------|-------------------|-------------------|
//! | < 7    | 1000        | 10 px             | 100 px            |
//! | 7..=9  | 1000        | 15 + (z-7)*5 px   | 200 + (z-7)*50 px |
//! | 10, 11 | 1000        | 12 px             | 180 px            |
//! | >= 12  | 10000       | 0                 | 0                 |

use map_common::{PixelPoint, PixelSize};
use serde::{Deserialize, Serialize};

/// Marker budget once spacing is no longer enforced.
pub const UNRESTRICTED_MAX_MARKERS: usize = 10_000;

/// Marker budget at every zoom below [`UNRESTRICTED_ZOOM`].
pub const DEFAULT_MAX_MARKERS: usize = 1_000;

/// Zoom from which every candidate may be shown.
pub const UNRESTRICTED_ZOOM: u32 = 12;

/// Spacing rule and marker budget for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityParams {
    pub max_markers: usize,
    /// Minimum spacing (px) required at the screen center
    pub min_dist_center: f64,
    /// Minimum spacing (px) required at the screen corner
    pub min_dist_edge: f64,
}

impl DensityParams {
    pub fn for_zoom(zoom: u32) -> Self {
        if zoom >= UNRESTRICTED_ZOOM {
            return Self {
                max_markers: UNRESTRICTED_MAX_MARKERS,
                min_dist_center: 0.0,
                min_dist_edge: 0.0,
            };
        }

        let (min_dist_center, min_dist_edge) = if zoom < 7 {
            // National view
            (10.0, 100.0)
        } else if zoom <= 9 {
            let steps = (zoom - 7) as f64;
            (15.0 + steps * 5.0, 200.0 + steps * 50.0)
        } else {
            (12.0, 180.0)
        };

        Self {
            max_markers: DEFAULT_MAX_MARKERS,
            min_dist_center,
            min_dist_edge,
        }
    }

    /// Minimum spacing required for a marker drawn at `pixel`.
    ///
    /// Linear between the center and corner values, by distance from the
    /// screen center normalized by the half-diagonal and capped at 1.
    pub fn required_distance(
        &self,
        pixel: PixelPoint,
        screen_center: PixelPoint,
        size: PixelSize,
    ) -> f64 {
        let max_screen_dist = size.half_diagonal();
        let ratio = if max_screen_dist > 0.0 {
            (pixel.distance(&screen_center) / max_screen_dist).min(1.0)
        } else {
            0.0
        };
        self.min_dist_center + (self.min_dist_edge - self.min_dist_center) * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_per_zoom_band() {
        let p = DensityParams::for_zoom(5);
        assert_eq!(p.max_markers, 1000);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (10.0, 100.0));

        let p = DensityParams::for_zoom(7);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (15.0, 200.0));

        let p = DensityParams::for_zoom(9);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (25.0, 300.0));

        let p = DensityParams::for_zoom(10);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (12.0, 180.0));

        let p = DensityParams::for_zoom(11);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (12.0, 180.0));

        let p = DensityParams::for_zoom(12);
        assert_eq!(p.max_markers, 10_000);
        assert_eq!((p.min_dist_center, p.min_dist_edge), (0.0, 0.0));
    }

    #[test]
    fn test_required_distance_interpolation() {
        let size = PixelSize::new(600, 800);
        let center = size.center();
        let p = DensityParams::for_zoom(5);

        assert!((p.required_distance(center, center, size) - 10.0).abs() < 1e-9);

        // Half way to the corner (half-diagonal is 500 px)
        let half = PixelPoint::new(center.x + 150.0, center.y + 200.0);
        assert!((p.required_distance(half, center, size) - 55.0).abs() < 1e-9);

        let corner = PixelPoint::new(0.0, 0.0);
        assert!((p.required_distance(corner, center, size) - 100.0).abs() < 1e-9);

        // Off-screen points are capped at the corner value
        let beyond = PixelPoint::new(-500.0, -500.0);
        assert!((p.required_distance(beyond, center, size) - 100.0).abs() < 1e-9);
    }
}
