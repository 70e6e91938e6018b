//! Insertion-ordered hash set of keys.
//!
//! [`OrderedKeySet`] pairs a hash index with the intrusive [`List`] so that
//! membership, removal and "move to newest" are all O(1) while iteration
//! still walks keys from oldest to newest.

extern crate alloc;

use crate::list::{Entry, Iter, List};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A set of keys that remembers the order in which they were inserted or
/// last promoted.
///
/// # Safety
///
/// The index stores raw pointers into `order`. They stay valid because a key
/// is always removed from the index in the same call that unlinks its node,
/// and `order` is only dropped together with the index.
pub(crate) struct OrderedKeySet<K, S> {
    index: HashMap<K, *mut Entry<K>, S>,
    order: List<K>,
}

// SAFETY: the set owns every node its pointers refer to; moving it between
// threads moves that ownership too.
unsafe impl<K: Send, S: Send> Send for OrderedKeySet<K, S> {}

// SAFETY: shared access only reads through the pointers; all mutation needs `&mut self`.
unsafe impl<K: Sync, S: Sync> Sync for OrderedKeySet<K, S> {}

impl<K: Hash + Eq + Clone, S: BuildHasher> OrderedKeySet<K, S> {
    pub(crate) fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        OrderedKeySet {
            index: HashMap::with_capacity_and_hasher(cap.get(), hash_builder),
            order: List::new(cap),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.order.is_full()
    }

    #[inline]
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Returns the stored key equal to `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get_key_value(key).map(|(k, _)| k)
    }

    /// Appends `key` at the newest end.
    ///
    /// Returns `false` and leaves the order untouched if the key is already
    /// present or the set is full.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        match self.order.push_back(key.clone()) {
            Some(node) => {
                self.index.insert(key, node);
                true
            }
            None => false,
        }
    }

    /// Removes `key`, returning the stored copy.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (stored, node) = self.index.remove_entry(key)?;
        // SAFETY: node came from the index, so it is linked into `order`
        let _ = unsafe { self.order.remove(node) };
        Some(stored)
    }

    /// Moves `key` to the newest end. Returns `false` if it is absent.
    pub(crate) fn promote<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.index.get(key).copied() {
            Some(node) => {
                // SAFETY: node came from the index, so it is linked into `order`
                unsafe { self.order.move_to_back(node) };
                true
            }
            None => false,
        }
    }

    /// Oldest key, i.e. the next one a pure order-based policy would evict.
    #[inline]
    pub(crate) fn oldest(&self) -> Option<&K> {
        self.order.front()
    }

    /// Keys from oldest to newest.
    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, K> {
        self.order.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }
}

impl<K, S> fmt::Debug for OrderedKeySet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedKeySet")
            .field("capacity", &self.order.cap())
            .field("len", &self.order.len())
            .finish()
    }
}
