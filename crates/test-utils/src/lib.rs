//! Test support shared by every crate in the station-dashboard workspace.
//!
//! - [`generators`]: seeded station catalogs and wind sample sets
//! - [`fixtures`]: the national overview and Tokyo viewports
//! - [`files`]: catalogs and config written to temporary files
//!
//! Pull it in as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod files;
pub mod fixtures;
pub mod generators;

pub use files::*;
pub use fixtures::*;
pub use generators::*;

/// Asserts `|actual - expected| <= tolerance` for anything convertible to `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} = {} is not within {} of {}",
            stringify!($actual),
            actual,
            tolerance,
            expected
        );
    }};
}

/// Asserts two values with `u`/`v` fields (wind samples or interpolated
/// vectors) agree component-wise within `tolerance`.
#[macro_export]
macro_rules! assert_wind_near {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected) = (&$actual, &$expected);
        $crate::assert_approx_eq!(actual.u, expected.u, $tolerance);
        $crate::assert_approx_eq!(actual.v, expected.v, $tolerance);
    }};
}
