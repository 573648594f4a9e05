//! Greedy, center-first marker selection.

use std::collections::HashSet;

use map_common::{PixelPoint, Station, Viewport};
use tracing::debug;

use crate::candidates::{filter_candidates, Candidate};
use crate::density::DensityParams;
use crate::lod::LevelThresholds;

/// Stations chosen for the current viewport, in acceptance order.
///
/// Invariants:
/// - `len() <= DensityParams::for_zoom(zoom).max_markers`
/// - every station is at least its own required spacing away (in pixels)
///   from every station accepted before it
#[derive(Debug, Clone, Default)]
pub struct SelectionSet<'a> {
    stations: Vec<&'a Station>,
    pixels: Vec<PixelPoint>,
}

impl<'a> SelectionSet<'a> {
    pub fn stations(&self) -> &[&'a Station] {
        &self.stations
    }

    /// Container pixel of each station, parallel to [`Self::stations`].
    pub fn pixels(&self) -> &[PixelPoint] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn codes(&self) -> HashSet<String> {
        self.stations.iter().map(|s| s.code.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Station> + '_ {
        self.stations.iter().copied()
    }
}

/// Pick a spatially separated subset of `candidates`.
///
/// Candidates must already be sorted by distance from the viewport center
/// (see [`filter_candidates`]). Each one is accepted when the marker budget
/// is not exhausted and its pixel distance to every accepted marker is at
/// least its own required spacing. Order-dependent: nearer-to-center
/// candidates win.
pub fn select_markers<'a, V: Viewport + ?Sized>(
    candidates: &[Candidate<'a>],
    viewport: &V,
    params: &DensityParams,
) -> SelectionSet<'a> {
    let size = viewport.size();
    let screen_center = viewport.project(viewport.center());
    let mut selection = SelectionSet::default();

    for candidate in candidates {
        if selection.len() >= params.max_markers {
            break;
        }

        let pixel = viewport.project(candidate.station.position());
        let required = params.required_distance(pixel, screen_center, size);

        let too_close = selection
            .pixels
            .iter()
            .any(|existing| pixel.distance(existing) < required);

        if !too_close {
            selection.stations.push(candidate.station);
            selection.pixels.push(pixel);
        }
    }

    selection
}

/// The full selection pass: candidate filter followed by declutter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Declutter {
    thresholds: LevelThresholds,
}

impl Declutter {
    pub fn new(thresholds: LevelThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &LevelThresholds {
        &self.thresholds
    }

    /// Select markers from `catalog` for the viewport as it is now.
    pub fn run<'a, V: Viewport + ?Sized>(
        &self,
        catalog: &'a [Station],
        viewport: &V,
    ) -> SelectionSet<'a> {
        let zoom = viewport.zoom();
        let candidates = filter_candidates(
            catalog,
            &viewport.bounds(),
            viewport.center(),
            zoom,
            &self.thresholds,
        );
        let params = DensityParams::for_zoom(zoom);
        let selection = select_markers(&candidates, viewport, &params);

        debug!(
            zoom = zoom,
            candidates = candidates.len(),
            selected = selection.len(),
            max_markers = params.max_markers,
            "Declutter pass complete"
        );

        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{LatLng, MercatorViewport, PixelSize, StationLevel};

    fn viewport(zoom: u32) -> MercatorViewport {
        MercatorViewport::new(LatLng::new(36.0, 138.0), zoom, PixelSize::new(1000, 800)).unwrap()
    }

    #[test]
    fn test_empty_candidates_yield_empty_selection() {
        let vp = viewport(5);
        let selection = select_markers(&[], &vp, &DensityParams::for_zoom(5));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_budget_is_respected() {
        let vp = viewport(12);
        let stations: Vec<Station> = (0..50)
            .map(|i| {
                Station::new(
                    i.to_string(),
                    "s",
                    36.0 + i as f64 * 0.0001,
                    138.0,
                    StationLevel::Coarse,
                )
            })
            .collect();
        let candidates: Vec<Candidate> = stations
            .iter()
            .map(|s| Candidate {
                station: s,
                dist_sq: s.position().dist_sq(&vp.center()),
            })
            .collect();

        let params = DensityParams {
            max_markers: 7,
            min_dist_center: 0.0,
            min_dist_edge: 0.0,
        };
        assert_eq!(select_markers(&candidates, &vp, &params).len(), 7);
    }

    #[test]
    fn test_pixels_parallel_to_stations() {
        let vp = viewport(8);
        let stations = vec![
            Station::new("a", "A", 36.0, 138.0, StationLevel::Coarse),
            Station::new("b", "B", 37.0, 139.0, StationLevel::Coarse),
        ];
        let selection = Declutter::default().run(&stations, &vp);
        assert_eq!(selection.len(), selection.pixels().len());
        for (station, pixel) in selection.stations().iter().zip(selection.pixels()) {
            assert_eq!(vp.project(station.position()), *pixel);
        }
    }
}
