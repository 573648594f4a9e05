//! Candidate filtering: bounds, level of detail and center ordering.

use map_common::{GeoBounds, LatLng, Station};

use crate::lod::LevelThresholds;

/// A station eligible for display in the current viewport.
///
/// Transient: recomputed on every selection pass.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub station: &'a Station,
    /// Squared distance to the viewport center in degree units
    pub dist_sq: f64,
}

/// Reduce the catalog to visible, zoom-appropriate stations.
///
/// The result is sorted ascending by squared distance from `center`. The
/// sort is stable, so stations at equal distance keep catalog order; the
/// declutter engine relies on this ordering for its tie-breaks.
pub fn filter_candidates<'a>(
    catalog: &'a [Station],
    bounds: &GeoBounds,
    center: LatLng,
    zoom: u32,
    thresholds: &LevelThresholds,
) -> Vec<Candidate<'a>> {
    let levels = thresholds.levels_at(zoom);

    let mut candidates: Vec<Candidate<'a>> = catalog
        .iter()
        .filter(|s| levels.contains(s.level) && bounds.contains(&s.position()))
        .map(|station| Candidate {
            station,
            dist_sq: station.position().dist_sq(&center),
        })
        .collect();

    candidates.sort_by(|a, b| a.dist_sq.total_cmp(&b.dist_sq));
    candidates
}
