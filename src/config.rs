//! Cache Configuration Module
//!
//! This module provides the configuration structure for
//! [`BoundedEvictionCache`](crate::BoundedEvictionCache).
//!
//! # Design Philosophy
//!
//! The configuration struct has public fields for simple instantiation:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: `capacity` is a `NonZeroUsize`, so a built config is always valid
//! - **Fallible entry point**: [`BoundedCacheConfig::try_new`] accepts a raw
//!   `usize` and reports a zero capacity as [`CacheError::InvalidArgument`]
//!
//! # Examples
//!
//! ```
//! use forgetting_cache::config::{BoundedCacheConfig, EvictionPolicy};
//! use forgetting_cache::BoundedEvictionCache;
//! use core::num::NonZeroUsize;
//!
//! let config = BoundedCacheConfig {
//!     capacity: NonZeroUsize::new(5).unwrap(),
//!     policy: EvictionPolicy::Frequency,
//! };
//! let cache: BoundedEvictionCache<u32> = BoundedEvictionCache::init(config);
//! assert_eq!(cache.capacity(), 5);
//! ```

use crate::error::CacheError;
use core::fmt;
use core::num::NonZeroUsize;

/// Strategy used to pick the key that leaves a full cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvictionPolicy {
    /// Evict the key that was inserted or last found the longest time ago.
    ///
    /// A successful `find` moves the key to the newest end of the order.
    Recency,
    /// Evict the key with the fewest hits since it was last inserted.
    ///
    /// Ties go to the key that sits earliest in insertion order.
    #[default]
    Frequency,
}

impl EvictionPolicy {
    /// Short name used in metrics output.
    pub fn name(self) -> &'static str {
        match self {
            EvictionPolicy::Recency => "Recency",
            EvictionPolicy::Frequency => "Frequency",
        }
    }
}

/// Configuration for a [`BoundedEvictionCache`](crate::BoundedEvictionCache).
///
/// # Fields
///
/// - `capacity`: Maximum number of keys the cache can hold
/// - `policy`: Eviction strategy applied when an insert finds the cache full
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoundedCacheConfig {
    /// Maximum number of keys the cache can hold
    pub capacity: NonZeroUsize,
    /// Eviction strategy
    pub policy: EvictionPolicy,
}

impl BoundedCacheConfig {
    /// Builds a config from a raw capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `capacity` is zero.
    ///
    /// ```
    /// use forgetting_cache::config::{BoundedCacheConfig, EvictionPolicy};
    ///
    /// assert!(BoundedCacheConfig::try_new(0, EvictionPolicy::Recency).is_err());
    /// assert_eq!(
    ///     BoundedCacheConfig::try_new(3, EvictionPolicy::Recency).unwrap().capacity.get(),
    ///     3
    /// );
    /// ```
    pub fn try_new(capacity: usize, policy: EvictionPolicy) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or(CacheError::InvalidArgument("capacity must be greater than zero"))?;
        Ok(Self { capacity, policy })
    }
}

impl fmt::Debug for BoundedCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCacheConfig")
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}
