//! In-memory LRU cache with per-entry time-to-live.
//!
//! Entries expire lazily: an expired entry is dropped the next time it is
//! read (or on an explicit [`TtlCache::purge_expired`]). Capacity is bounded
//! by entry count; inserting past capacity evicts the least recently used
//! entry.
//!
//! ## Metrics
//!
//! The cache tracks hit/miss/expiry/eviction counters that the owner can
//! log or export:
//! - `hits`/`misses`: Cache hit rate
//! - `expired`: Entries dropped on read after their TTL
//! - `evictions`: Entries pushed out by the capacity bound

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Default TTL for station series and wind observations (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Generic TTL cache shared by reference between async tasks.
///
/// Design considerations:
/// - Each call takes the lock for the whole read-modify-write, so a reader
///   never sees a half-applied update
/// - TTL enforcement on read (lazy expiration)
/// - Values are cloned out; store `Arc`s for large payloads
pub struct TtlCache<K, V> {
    entries: RwLock<LruCache<K, CachedEntry<V>>>,
    default_ttl: Duration,
    stats: TtlCacheStats,
}

struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Statistics for a TTL cache.
///
/// All fields are atomic for lock-free reads.
#[derive(Debug, Default)]
pub struct TtlCacheStats {
    /// Total cache hits
    pub hits: AtomicU64,
    /// Total cache misses (including expired reads)
    pub misses: AtomicU64,
    /// Total entries expired via TTL
    pub expired: AtomicU64,
    /// Total entries evicted by the capacity bound
    pub evictions: AtomicU64,
}

impl TtlCacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use storage::TtlCache;
    ///
    /// // 5000 entries with a 10 minute TTL
    /// let cache: TtlCache<String, f64> = TtlCache::new(5000, Duration::from_secs(600));
    /// ```
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            default_ttl,
            stats: TtlCacheStats::default(),
        }
    }

    /// Get a value (returns None if expired or missing).
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().await;

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value with the default TTL, replacing any previous entry.
    pub async fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl).await;
    }

    /// Store a value with an explicit TTL.
    pub async fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let entry = CachedEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };

        let mut entries = self.entries.write().await;
        if let Some((evicted_key, _)) = entries.push(key.clone(), entry) {
            // push() also returns the old value when replacing the same key
            if evicted_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Remove an entry, returning its value if it was present and fresh.
    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().await;
        entries
            .pop(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value)
    }

    /// Snapshot of every unexpired value, most recently used first.
    ///
    /// Does not touch recency or hit counters.
    pub async fn values(&self) -> Vec<V> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(_, entry)| entry.value.clone())
            .collect()
    }

    /// Drop every expired entry. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let stale: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            entries.pop(key);
        }

        if !stale.is_empty() {
            self.stats
                .expired
                .fetch_add(stale.len() as u64, Ordering::Relaxed);
            debug!(
                removed = stale.len(),
                remaining = entries.len(),
                "Purged expired cache entries"
            );
        }
        stale.len()
    }

    /// Current number of entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> &TtlCacheStats {
        &self.stats
    }
}
