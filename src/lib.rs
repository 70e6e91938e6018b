#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Policy Selection Guide
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Which Eviction Policy Should I Use?                 │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  Do keys that were looked up often deserve to outlive newer keys?   │
//! │                                                                     │
//! │        Yes ──▶ ┌───────────────────────────┐                        │
//! │                │ EvictionPolicy::Frequency │                        │
//! │                └───────────────────────────┘                        │
//! │        No  ──▶ ┌───────────────────────────┐                        │
//! │                │ EvictionPolicy::Recency   │                        │
//! │                └───────────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Policy | Victim | Tie-break | `find` hit does |
//! |--------|--------|-----------|-----------------|
//! | [`Recency`](EvictionPolicy::Recency) | oldest inserted or found key | n/a | moves key to newest |
//! | [`Frequency`](EvictionPolicy::Frequency) | lowest hit counter | oldest position | increments counter |
//!
//! ## Performance Characteristics
//!
//! | Policy | `find` | `add` (not full) | `add` (evicting) | `popularity` |
//! |--------|--------|------------------|------------------|--------------|
//! | Recency | O(1) | O(1) | O(1) | O(1) |
//! | Frequency | O(1) | O(1) | O(n) | O(1) |
//!
//! The frequency policy scans the ordered key set to find the least-hit key,
//! so an evicting insert is linear in the capacity.
//!
//! ## Code Examples
//!
//! ### Recency
//!
//! ```rust
//! use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
//!
//! let cache = BoundedEvictionCache::new(5, EvictionPolicy::Recency).unwrap();
//! for key in 1..=5 {
//!     cache.add(key);
//! }
//! cache.find(&1);     // 1 becomes the newest key
//! cache.add(6);       // 2 is evicted
//! assert!(cache.find(&2).is_none());
//! assert!(cache.find(&1).is_some());
//! ```
//!
//! ### Frequency
//!
//! ```rust
//! use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
//!
//! let cache = BoundedEvictionCache::new(5, EvictionPolicy::Frequency).unwrap();
//! for key in 1..=5 {
//!     cache.add(key);
//! }
//! for _ in 0..3 {
//!     cache.find(&1);
//! }
//! assert_eq!(cache.popularity(&1), 4);
//!
//! // 2, 3, 4 and 5 all have one hit; 2 is the oldest of them
//! assert_eq!(cache.add(6), Some(2));
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the thread-safe [`BoundedEvictionCache`]
//! - [`config`]: configuration and [`EvictionPolicy`]
//! - [`error`]: [`CacheError`]
//! - [`metrics`]: metrics collection for cache monitoring

#![no_std]

#[cfg(not(feature = "hashbrown"))]
extern crate std;

/// Doubly linked list backing the ordered key set.
///
/// **Note**: This module is internal infrastructure. It exposes raw pointer
/// operations that require careful invariant maintenance.
pub(crate) mod list;

/// Hash set that remembers insertion and promotion order.
pub(crate) mod keyset;

/// Single-threaded eviction algorithm shared by the locked cache.
pub(crate) mod segment;

/// Cache configuration structures.
pub mod config;

/// Error types.
pub mod error;

/// Cache metrics system.
///
/// Provides counters for hits, misses, insertions and evictions, plus
/// policy-specific counters, reported through the [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

/// Thread-safe bounded cache.
///
/// Provides [`BoundedEvictionCache`], which guards the eviction algorithm
/// with a single reader/writer lock.
pub mod cache;

pub use cache::BoundedEvictionCache;
pub use config::{BoundedCacheConfig, EvictionPolicy};
pub use error::CacheError;
pub use metrics::{CacheMetrics, EvictionCacheMetrics};
