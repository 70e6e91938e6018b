//! Single-threaded eviction algorithm.
//!
//! [`EvictionSegment`] holds the ordered key set and, for the frequency
//! policy, the hit-count map. Every method takes the segment as a whole, so
//! whoever owns it (the lock in [`BoundedEvictionCache`](crate::BoundedEvictionCache))
//! always sees both structures agree.

extern crate alloc;

use crate::config::{BoundedCacheConfig, EvictionPolicy};
use crate::keyset::OrderedKeySet;
use crate::metrics::EvictionCacheMetrics;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::trace;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Per-policy bookkeeping kept next to the ordered key set.
enum Tracking<K, S> {
    /// Order alone decides; there is no hit map.
    Recency,
    /// Hit counter per present key. Its key set mirrors the ordered set.
    Frequency(HashMap<K, u64, S>),
}

/// Internal segment containing the eviction algorithm.
///
/// Invariants, checked by [`EvictionSegment::is_consistent`]:
/// - `len() <= cap()`
/// - with the frequency policy, the hit map and the ordered set hold the same keys
/// - every hit counter is at least 1
pub(crate) struct EvictionSegment<K, S> {
    config: BoundedCacheConfig,
    keys: OrderedKeySet<K, S>,
    tracking: Tracking<K, S>,
    metrics: EvictionCacheMetrics,
}

impl<K: Hash + Eq + Clone, S: BuildHasher + Clone> EvictionSegment<K, S> {
    pub(crate) fn with_hasher(config: BoundedCacheConfig, hash_builder: S) -> Self {
        let tracking = match config.policy {
            EvictionPolicy::Recency => Tracking::Recency,
            EvictionPolicy::Frequency => Tracking::Frequency(HashMap::with_capacity_and_hasher(
                config.capacity.get(),
                hash_builder.clone(),
            )),
        };
        EvictionSegment {
            config,
            keys: OrderedKeySet::with_hasher(config.capacity, hash_builder),
            tracking,
            metrics: EvictionCacheMetrics::new(config.policy),
        }
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> EvictionSegment<K, S> {
    #[inline]
    pub(crate) fn cap(&self) -> usize {
        self.config.capacity.get()
    }

    #[inline]
    pub(crate) fn policy(&self) -> EvictionPolicy {
        self.config.policy
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &EvictionCacheMetrics {
        &self.metrics
    }

    #[inline]
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.keys.contains(key)
    }

    /// Hit counter for `key`, or 0 if it is absent or the policy keeps none.
    pub(crate) fn popularity<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match &self.tracking {
            Tracking::Recency => 0,
            Tracking::Frequency(hits) => hits.get(key).copied().unwrap_or(0),
        }
    }

    /// Looks `key` up and promotes it on a hit.
    pub(crate) fn find<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(found) = self.keys.get(key).cloned() else {
            self.metrics.core.record_miss();
            return None;
        };

        match &mut self.tracking {
            Tracking::Recency => {
                self.keys.promote(key);
                self.metrics.record_promotion();
                trace!("recency policy promoted a key to newest");
            }
            Tracking::Frequency(hits) => {
                if let Some(count) = hits.get_mut(key) {
                    *count += 1;
                    self.metrics.record_frequency_increment(*count);
                }
            }
        }
        self.metrics.core.record_hit();
        Some(found)
    }

    /// Inserts `key`, evicting one key first if the cache is full.
    ///
    /// The eviction happens whenever the cache is full, even if `key` is
    /// already present; the victim may be `key` itself, in which case it is
    /// appended again as a new entry. A key that survives keeps its position
    /// and has its hit counter reset to 1.
    pub(crate) fn add(&mut self, key: K) -> Option<K> {
        let evicted = if self.keys.is_full() {
            self.evict()
        } else {
            None
        };

        if self.keys.contains(&key) {
            if let Tracking::Frequency(hits) = &mut self.tracking {
                if let Some(count) = hits.get_mut(&key) {
                    *count = 1;
                }
            }
            self.metrics.core.record_reinsertion();
        } else {
            let inserted = self.keys.insert(key.clone());
            debug_assert!(inserted, "insert after eviction must find room");
            if let Tracking::Frequency(hits) = &mut self.tracking {
                hits.insert(key, 1);
            }
            self.metrics.core.record_insertion();
        }

        debug_assert!(self.is_consistent());
        evicted
    }

    /// Removes `key` from both structures.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let stored = self.keys.remove(key)?;
        if let Tracking::Frequency(hits) = &mut self.tracking {
            hits.remove(key);
        }
        Some(stored)
    }

    pub(crate) fn clear(&mut self) {
        self.keys.clear();
        if let Tracking::Frequency(hits) = &mut self.tracking {
            hits.clear();
        }
    }

    /// Keys from oldest to newest.
    pub(crate) fn keys(&self) -> Vec<K> {
        self.keys.iter().cloned().collect()
    }

    /// The key the active policy would evict next.
    ///
    /// Frequency ties go to the key met first walking from oldest to newest,
    /// which `min_by_key` guarantees by returning the first minimum.
    pub(crate) fn eviction_candidate(&self) -> Option<&K> {
        match &self.tracking {
            Tracking::Recency => self.keys.oldest(),
            Tracking::Frequency(hits) => self
                .keys
                .iter()
                .min_by_key(|key| hits.get(*key).copied().unwrap_or(0)),
        }
    }

    fn evict(&mut self) -> Option<K> {
        let victim = self.eviction_candidate()?.clone();
        let evicted = self.remove(&victim)?;
        self.metrics.core.record_eviction();
        trace!(
            "{} policy evicted a key at capacity {}",
            self.config.policy.name(),
            self.cap()
        );
        Some(evicted)
    }

    /// Checks that the ordered set and the hit map describe the same keys.
    pub(crate) fn is_consistent(&self) -> bool {
        if self.keys.len() > self.cap() {
            return false;
        }
        match &self.tracking {
            Tracking::Recency => true,
            Tracking::Frequency(hits) => {
                hits.len() == self.keys.len()
                    && hits.values().all(|&count| count >= 1)
                    && self.keys.iter().all(|key| hits.contains_key(key))
            }
        }
    }
}

impl<K, S> fmt::Debug for EvictionSegment<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionSegment")
            .field("config", &self.config)
            .field("keys", &self.keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::NonZeroUsize;

    #[cfg(feature = "hashbrown")]
    use hashbrown::DefaultHashBuilder;
    #[cfg(not(feature = "hashbrown"))]
    use std::collections::hash_map::RandomState as DefaultHashBuilder;

    fn segment(cap: usize, policy: EvictionPolicy) -> EvictionSegment<u32, DefaultHashBuilder> {
        let config = BoundedCacheConfig {
            capacity: NonZeroUsize::new(cap).unwrap(),
            policy,
        };
        EvictionSegment::with_hasher(config, DefaultHashBuilder::default())
    }

    #[test]
    fn test_recency_candidate_is_oldest() {
        let mut seg = segment(3, EvictionPolicy::Recency);
        seg.add(1);
        seg.add(2);
        seg.add(3);
        assert_eq!(seg.eviction_candidate(), Some(&1));

        assert_eq!(seg.find(&1), Some(1));
        assert_eq!(seg.eviction_candidate(), Some(&2));
        assert_eq!(seg.keys(), [2, 3, 1]);
    }

    #[test]
    fn test_frequency_candidate_breaks_ties_by_order() {
        let mut seg = segment(4, EvictionPolicy::Frequency);
        for key in 1..=4 {
            seg.add(key);
        }
        seg.find(&1);
        seg.find(&2);
        assert_eq!(seg.eviction_candidate(), Some(&3));

        seg.find(&3);
        seg.find(&4);
        seg.find(&3);
        // 1, 2 and 4 are tied at 2 hits; 1 is oldest
        assert_eq!(seg.eviction_candidate(), Some(&1));
    }

    #[test]
    fn test_frequency_find_does_not_reorder() {
        let mut seg = segment(3, EvictionPolicy::Frequency);
        seg.add(1);
        seg.add(2);
        seg.find(&1);
        assert_eq!(seg.keys(), [1, 2]);
        assert_eq!(seg.popularity(&1), 2);
    }

    #[test]
    fn test_empty_segment_has_no_candidate() {
        let seg = segment(2, EvictionPolicy::Frequency);
        assert_eq!(seg.eviction_candidate(), None);
        assert!(seg.is_consistent());
    }

    #[test]
    fn test_add_returns_evicted_key() {
        let mut seg = segment(2, EvictionPolicy::Frequency);
        assert_eq!(seg.add(1), None);
        assert_eq!(seg.add(2), None);
        seg.find(&1);
        assert_eq!(seg.add(3), Some(2));
        assert_eq!(seg.metrics().core.evictions, 1);
        assert!(seg.is_consistent());
    }

    #[test]
    fn test_reinsert_at_capacity_still_evicts() {
        let mut seg = segment(2, EvictionPolicy::Frequency);
        seg.add(1);
        seg.add(2);
        seg.find(&2);

        // Full, so 1 (one hit) goes before 2 is re-added
        assert_eq!(seg.add(2), Some(1));
        assert_eq!(seg.len(), 1);
        assert_eq!(seg.popularity(&2), 1);
        assert_eq!(seg.keys(), [2]);
        assert_eq!(seg.metrics().core.reinsertions, 1);
        assert_eq!(seg.metrics().core.evictions, 1);
        assert!(seg.is_consistent());
    }

    #[test]
    fn test_reinsert_can_evict_itself() {
        let mut seg = segment(2, EvictionPolicy::Recency);
        seg.add(1);
        seg.add(2);

        // 1 is oldest, so it is evicted and then appended as newest
        assert_eq!(seg.add(1), Some(1));
        assert_eq!(seg.keys(), [2, 1]);
        assert_eq!(seg.metrics().core.insertions, 3);
        assert_eq!(seg.metrics().core.reinsertions, 0);
    }

    #[test]
    fn test_reinsert_below_capacity_keeps_position() {
        let mut seg = segment(3, EvictionPolicy::Frequency);
        seg.add(1);
        seg.add(2);
        seg.find(&1);

        assert_eq!(seg.add(1), None);
        assert_eq!(seg.keys(), [1, 2]);
        assert_eq!(seg.popularity(&1), 1);
    }

    #[test]
    fn test_remove_and_clear_keep_structures_in_step() {
        let mut seg = segment(3, EvictionPolicy::Frequency);
        seg.add(1);
        seg.add(2);
        assert_eq!(seg.remove(&1), Some(1));
        assert_eq!(seg.popularity(&1), 0);
        assert!(seg.is_consistent());

        seg.clear();
        assert_eq!(seg.len(), 0);
        assert!(seg.is_consistent());
    }

    #[test]
    fn test_recency_popularity_is_zero() {
        let mut seg = segment(2, EvictionPolicy::Recency);
        seg.add(1);
        seg.find(&1);
        assert_eq!(seg.popularity(&1), 0);
        assert_eq!(seg.metrics().promotions, 1);
    }
}
