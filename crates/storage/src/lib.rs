//! Cache abstractions for the station dashboard.
//!
//! Provides an explicit, shareable cache object with TTL expiry that the
//! marker lifecycle manager and the weather overlay receive by reference,
//! plus the key types they use.

pub mod keys;
pub mod ttl_cache;

pub use keys::SeriesKey;
pub use ttl_cache::{TtlCache, TtlCacheStats, DEFAULT_TTL};
