//! Marker selection for a pannable, zoomable station map.
//!
//! Selection happens in two stages on every viewport change:
//! - [`candidates`]: keep stations inside the visible bounds whose level of
//!   detail is enabled at the current zoom, sorted by distance from the
//!   viewport center
//! - [`select`]: greedily accept candidates, nearest to the center first,
//!   as long as they keep a zoom- and position-dependent pixel spacing to
//!   every marker already accepted

pub mod candidates;
pub mod density;
pub mod lod;
pub mod select;

pub use candidates::{filter_candidates, Candidate};
pub use density::DensityParams;
pub use lod::{LevelSet, LevelThresholds};
pub use select::{select_markers, Declutter, SelectionSet};
