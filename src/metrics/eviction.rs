//! Eviction Cache Metrics
//!
//! Metrics for [`BoundedEvictionCache`](crate::BoundedEvictionCache). The
//! core counters apply to both policies; promotion and frequency counters are
//! only ever non-zero for the policy that produces them.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use crate::config::EvictionPolicy;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Policy-aware metrics (extends CoreCacheMetrics)
#[derive(Debug, Clone)]
pub struct EvictionCacheMetrics {
    /// Core metrics common to both policies
    pub core: CoreCacheMetrics,

    /// Policy the cache was built with
    pub policy: EvictionPolicy,

    /// Number of hits that moved a key to the newest position (recency policy)
    pub promotions: u64,

    /// Number of hit-counter increments (frequency policy)
    pub total_frequency_increments: u64,

    /// Highest hit counter observed since the cache was created
    pub max_frequency: u64,
}

impl EvictionCacheMetrics {
    /// Creates empty metrics for a cache using `policy`
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            core: CoreCacheMetrics::default(),
            policy,
            promotions: 0,
            total_frequency_increments: 0,
            max_frequency: 0,
        }
    }

    /// Records a hit that promoted the key to the newest position
    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    /// Records a hit-counter increment to `new_frequency`
    pub fn record_frequency_increment(&mut self, new_frequency: u64) {
        self.total_frequency_increments += 1;
        if new_frequency > self.max_frequency {
            self.max_frequency = new_frequency;
        }
    }

    /// Average number of counter increments per hit
    pub fn average_frequency(&self) -> f64 {
        if self.core.cache_hits > 0 {
            self.total_frequency_increments as f64 / self.core.cache_hits as f64
        } else {
            0.0
        }
    }

    /// Converts the metrics to a BTreeMap for reporting
    ///
    /// Only the counters that belong to the configured policy are reported.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        match self.policy {
            EvictionPolicy::Recency => {
                metrics.insert("promotions".to_string(), self.promotions as f64);
            }
            EvictionPolicy::Frequency => {
                metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
                metrics.insert(
                    "total_frequency_increments".to_string(),
                    self.total_frequency_increments as f64,
                );
                metrics.insert("average_frequency".to_string(), self.average_frequency());
            }
        }

        metrics
    }
}

impl CacheMetrics for EvictionCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.policy.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_policy_reports_frequency_keys() {
        let mut metrics = EvictionCacheMetrics::new(EvictionPolicy::Frequency);
        metrics.core.record_hit();
        metrics.record_frequency_increment(2);
        metrics.core.record_hit();
        metrics.record_frequency_increment(3);

        let map = metrics.metrics();
        assert_eq!(map.get("max_frequency"), Some(&3.0));
        assert_eq!(map.get("total_frequency_increments"), Some(&2.0));
        assert_eq!(map.get("average_frequency"), Some(&1.0));
        assert!(!map.contains_key("promotions"));
        assert_eq!(metrics.algorithm_name(), "Frequency");
    }

    #[test]
    fn test_recency_policy_reports_promotions() {
        let mut metrics = EvictionCacheMetrics::new(EvictionPolicy::Recency);
        metrics.record_promotion();

        let map = metrics.metrics();
        assert_eq!(map.get("promotions"), Some(&1.0));
        assert!(!map.contains_key("max_frequency"));
        assert_eq!(metrics.algorithm_name(), "Recency");
    }
}
