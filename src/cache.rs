//! Bounded Concurrent Eviction Cache
//!
//! A thread-safe, fixed-capacity key cache. When an insert finds the cache
//! full, one key is evicted according to the [`EvictionPolicy`] picked at
//! construction.
//!
//! # How It Works
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   BoundedEvictionCache                       │
//! │                                                              │
//! │   ┌──────────────────── RwLock ───────────────────────────┐  │
//! │   │                  EvictionSegment                      │  │
//! │   │                                                       │  │
//! │   │   ordered key set   oldest ─▶ k1 ─ k2 ─ k3 ◀─ newest  │  │
//! │   │   hit counts        { k1: 4, k2: 1, k3: 1 }           │  │
//! │   │                     (frequency policy only)           │  │
//! │   └───────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both structures live behind one lock, so no thread ever sees a key in one
//! and not the other.
//!
//! ## Lock Discipline
//!
//! | Operation | Mode |
//! |-----------|------|
//! | `size`, `popularity`, `contains`, `keys` | shared |
//! | `add`, `remove`, `clear` | exclusive for the whole call |
//! | `find` | shared probe; exclusive only on a hit |
//!
//! `find` never upgrades a held read guard. A hit drops the shared guard,
//! takes the exclusive guard and looks the key up again before mutating, so
//! a key evicted in between is reported as a miss.
//!
//! # Example
//!
//! ```rust
//! use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(BoundedEvictionCache::new(5, EvictionPolicy::Frequency).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for key in 1..=8 {
//!                 cache.add(key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(cache.size() <= 5);
//! assert!(cache.is_consistent());
//! ```

extern crate alloc;

use crate::config::{BoundedCacheConfig, EvictionPolicy};
use crate::error::CacheError;
use crate::metrics::{CacheMetrics, EvictionCacheMetrics};
use crate::segment::EvictionSegment;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::sync::atomic::{AtomicU64, Ordering};
use log::debug;
use parking_lot::RwLock;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A fixed-capacity, thread-safe key cache with policy-driven eviction.
pub struct BoundedEvictionCache<K, S = DefaultHashBuilder> {
    segment: RwLock<EvictionSegment<K, S>>,
    /// Misses answered from the shared probe in `find`, which cannot touch
    /// the segment's own counters.
    probe_misses: AtomicU64,
}

impl<K> BoundedEvictionCache<K, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache holding at most `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `capacity` is zero.
    ///
    /// ```
    /// use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
    ///
    /// let cache: BoundedEvictionCache<u32> =
    ///     BoundedEvictionCache::new(3, EvictionPolicy::Recency).unwrap();
    /// assert_eq!(cache.capacity(), 3);
    /// assert!(BoundedEvictionCache::<u32>::new(0, EvictionPolicy::Recency).is_err());
    /// ```
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self, CacheError> {
        let config = BoundedCacheConfig::try_new(capacity, policy)?;
        Ok(Self::init(config))
    }

    /// Creates a cache from an already validated configuration.
    pub fn init(config: BoundedCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, S> BoundedEvictionCache<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates a cache that hashes keys with `hash_builder`.
    pub fn with_hasher(config: BoundedCacheConfig, hash_builder: S) -> Self {
        debug!(
            "creating bounded eviction cache: capacity={}, policy={}",
            config.capacity,
            config.policy.name()
        );
        Self {
            segment: RwLock::new(EvictionSegment::with_hasher(config, hash_builder)),
            probe_misses: AtomicU64::new(0),
        }
    }
}

impl<K, S> BoundedEvictionCache<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Returns the current number of keys.
    pub fn size(&self) -> usize {
        self.segment.read().len()
    }

    /// Alias for [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// Returns `true` if the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the maximum number of keys the cache can hold.
    pub fn capacity(&self) -> usize {
        self.segment.read().cap()
    }

    /// Returns the eviction policy chosen at construction.
    pub fn policy(&self) -> EvictionPolicy {
        self.segment.read().policy()
    }

    /// Inserts `key`.
    ///
    /// If the cache is full, one key is evicted first and returned. This
    /// happens even when `key` is already cached, so re-adding a key to a
    /// full cache shrinks it by one unless the victim was `key` itself,
    /// which is then appended as the newest key. A re-added key that
    /// survives keeps its position; under the frequency policy its hit
    /// counter is reset to 1.
    ///
    /// ```
    /// use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
    ///
    /// let cache = BoundedEvictionCache::new(2, EvictionPolicy::Recency).unwrap();
    /// cache.add("a");
    /// cache.add("b");
    /// assert_eq!(cache.add("c"), Some("a"));
    ///
    /// // Full again: "b" is evicted even though "c" is already cached
    /// assert_eq!(cache.add("c"), Some("b"));
    /// assert_eq!(cache.size(), 1);
    /// ```
    pub fn add(&self, key: K) -> Option<K> {
        self.segment.write().add(key)
    }

    /// Looks `key` up, returning the cached copy on a hit.
    ///
    /// A hit promotes the key: the recency policy moves it to the newest
    /// position, the frequency policy increments its hit counter. A miss
    /// changes nothing.
    ///
    /// ```
    /// use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
    ///
    /// let cache = BoundedEvictionCache::new(2, EvictionPolicy::Frequency).unwrap();
    /// cache.add(7);
    /// assert_eq!(cache.find(&7), Some(7));
    /// assert_eq!(cache.popularity(&7), 2);
    /// assert_eq!(cache.find(&8), None);
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        {
            let segment = self.segment.read();
            if !segment.contains(key) {
                self.probe_misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
        self.segment.write().find(key)
    }

    /// Returns the hit counter of `key`, or 0 if it is not cached.
    ///
    /// Always 0 under the recency policy, which keeps no counters. Unlike
    /// [`find`](Self::find), this never promotes the key.
    pub fn popularity<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.read().popularity(key)
    }

    /// Alias for [`popularity`](Self::popularity).
    #[inline]
    pub fn get_popularity<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.popularity(key)
    }

    /// Returns `true` if `key` is cached, without promoting it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.read().contains(key)
    }

    /// Snapshot of the cached keys from oldest to newest.
    pub fn keys(&self) -> Vec<K> {
        self.segment.read().keys()
    }

    /// Removes `key`, returning the cached copy if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.write().remove(key)
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.segment.write().clear();
    }

    /// Verifies that the internal structures agree with each other and with
    /// the capacity.
    pub fn is_consistent(&self) -> bool {
        self.segment.read().is_consistent()
    }

    /// Returns a copy of the cache's metrics.
    ///
    /// The probe-miss counter is read while the shared guard is held, so no
    /// hit or eviction can land between the two reads.
    pub fn stats(&self) -> EvictionCacheMetrics {
        let segment = self.segment.read();
        let mut stats = segment.metrics().clone();
        stats.core.requests += self.probe_misses.load(Ordering::Relaxed);
        stats
    }
}

impl<K, S> CacheMetrics for BoundedEvictionCache<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.stats().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.policy().name()
    }
}

impl<K, S> core::fmt::Debug for BoundedEvictionCache<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.segment.try_read() {
            Some(segment) => f
                .debug_struct("BoundedEvictionCache")
                .field("segment", &*segment)
                .finish(),
            None => f
                .debug_struct("BoundedEvictionCache")
                .field("segment", &"<locked>")
                .finish(),
        }
    }
}
