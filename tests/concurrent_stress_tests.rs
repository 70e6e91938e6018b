//! Stress Tests for the Concurrent Cache
//!
//! These tests verify thread safety and correctness under high contention.
//! Exact contents after a race depend on the interleaving, so the checks are
//! on invariants that every linearizable history must satisfy.

use forgetting_cache::{BoundedEvictionCache, EvictionPolicy};
use scoped_threadpool::Pool;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

const POLICIES: [EvictionPolicy; 2] = [EvictionPolicy::Recency, EvictionPolicy::Frequency];

/// Every thread inserts the same overflowing sequence of keys.
#[test]
fn stress_same_overflowing_sequence() {
    for policy in POLICIES {
        let cache: Arc<BoundedEvictionCache<u32>> =
            Arc::new(BoundedEvictionCache::new(5, policy).unwrap());

        let mut handles = Vec::new();
        for _ in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    for key in 1..=8 {
                        cache.add(key);
                        assert!(cache.size() <= 5);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // A re-add into a full cache evicts without growing it again, so
        // the race can end one short of capacity
        assert!(cache.size() <= 5);
        assert!(!cache.is_empty());
        assert!(cache.is_consistent());
        assert!(cache.keys().iter().all(|key| (1..=8).contains(key)));
    }
}

/// Three workers race through the same overflowing sequence, then the main
/// thread adds it once more. Whatever the race left behind, the last five
/// keys of the sequence must be all that remains.
#[test]
fn stress_sequential_pass_after_race() {
    for policy in POLICIES {
        for _ in 0..50 {
            let cache: Arc<BoundedEvictionCache<u32>> =
                Arc::new(BoundedEvictionCache::new(5, policy).unwrap());

            let mut pool = Pool::new(5);
            pool.scoped(|scope| {
                for _ in 0..3 {
                    let cache = &cache;
                    scope.execute(move || {
                        for key in 1..=8 {
                            cache.add(key);
                        }
                    });
                }
            });

            let size_after_race = cache.size();
            assert!((4..=5).contains(&size_after_race));

            for key in 1..=8 {
                cache.add(key);
            }

            for key in 1..=3 {
                assert!(cache.find(&key).is_none(), "{key} should be evicted");
            }
            for key in 4..=8 {
                assert!(cache.find(&key).is_some(), "{key} should be cached");
            }
            assert_eq!(cache.size(), 5);
        }
    }
}

/// Every key that entered the cache is either still there or was handed back
/// by exactly one evicting `add`.
#[test]
fn stress_insertions_balance_evictions() {
    for policy in POLICIES {
        let cache: Arc<BoundedEvictionCache<usize>> =
            Arc::new(BoundedEvictionCache::new(64, policy).unwrap());
        let evicted = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for t in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            let evicted = Arc::clone(&evicted);
            handles.push(thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * 7 + i) % 200;
                    if cache.add(key).is_some() {
                        evicted.fetch_add(1, Ordering::Relaxed);
                    }
                    if i % 4 == 0 {
                        let _ = cache.find(&((key + 3) % 200));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let stats = cache.stats();
        assert_eq!(stats.core.evictions, evicted.load(Ordering::Relaxed));
        assert_eq!(
            stats.core.insertions - stats.core.evictions,
            cache.size() as u64
        );
        assert_eq!(
            stats.core.insertions + stats.core.reinsertions,
            (NUM_THREADS * OPS_PER_THREAD) as u64
        );
        assert!(cache.is_consistent());
    }
}

/// Readers and writers hammer a small key range.
#[test]
fn stress_high_contention_readers_and_writers() {
    let cache: Arc<BoundedEvictionCache<usize>> =
        Arc::new(BoundedEvictionCache::new(10, EvictionPolicy::Frequency).unwrap());
    let hits = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        let hits = Arc::clone(&hits);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = i % 20;
                match t % 4 {
                    0 => {
                        cache.add(key);
                    }
                    1 => {
                        if cache.find(&key).is_some() {
                            hits.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    2 => {
                        let _ = cache.popularity(&key);
                        let _ = cache.size();
                    }
                    _ => {
                        assert!(cache.is_consistent());
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.size() <= 10);
    assert!(cache.is_consistent());
    assert_eq!(cache.stats().core.cache_hits, hits.load(Ordering::Relaxed) as u64);

    for key in cache.keys() {
        assert!(cache.popularity(&key) >= 1);
    }
    for key in 0..20 {
        if !cache.contains(&key) {
            assert_eq!(cache.popularity(&key), 0);
        }
    }
}

/// Removals racing with inserts never leave the two structures out of step.
#[test]
fn stress_remove_and_clear_race() {
    let cache: Arc<BoundedEvictionCache<usize>> =
        Arc::new(BoundedEvictionCache::new(32, EvictionPolicy::Frequency).unwrap());

    let mut handles = Vec::new();
    for t in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..2_000 {
                let key = (t * 31 + i) % 64;
                match i % 10 {
                    0 => {
                        let _ = cache.remove(&key);
                    }
                    9 if t == 0 => cache.clear(),
                    _ => {
                        cache.add(key);
                        let _ = cache.find(&key);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.size() <= 32);
    assert!(cache.is_consistent());
}
