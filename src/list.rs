extern crate alloc;

use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

/// A node in the doubly linked list.
///
/// Contains a value and pointers to the previous and next entries.
/// This structure is not meant to be used directly by users of the `List`.
pub struct Entry<T> {
    /// The value stored in this entry. Uses MaybeUninit to allow for sigil nodes.
    val: mem::MaybeUninit<T>,
    /// Pointer to the previous entry in the list.
    prev: *mut Entry<T>,
    /// Pointer to the next entry in the list.
    next: *mut Entry<T>,
}

impl<T> Entry<T> {
    fn new(val: T) -> Self {
        Entry {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Creates a sigil (sentinel) entry without initializing the value.
    fn new_sigil() -> Self {
        Entry {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Returns a reference to the value held by this entry.
    ///
    /// # Safety
    ///
    /// The value must be initialized, i.e. this must not be a sigil node.
    pub unsafe fn get_value(&self) -> &T {
        self.val.assume_init_ref()
    }
}

/// A doubly linked list ordered from oldest (front) to newest (back).
///
/// The list never holds more than `cap` items. Sentinel nodes at both ends
/// keep every splice branch-free. Nodes are handed out as raw pointers so an
/// owning index can reach them in O(1); the index is responsible for never
/// using a pointer after the node has been removed.
///
/// # Examples
///
/// ```ignore
/// use forgetting_cache::list::List;
/// use core::num::NonZeroUsize;
///
/// let mut list = List::new(NonZeroUsize::new(2).unwrap());
/// let first = list.push_back(10).unwrap();
/// list.push_back(20).unwrap();
///
/// unsafe { list.move_to_back(first) };
/// assert_eq!(list.pop_front(), Some(20));
/// ```
pub struct List<T> {
    /// Maximum number of items the list can hold.
    cap: NonZeroUsize,
    /// Current number of items in the list.
    len: usize,
    /// Pointer to the head sentinel node.
    head: *mut Entry<T>,
    /// Pointer to the tail sentinel node.
    tail: *mut Entry<T>,
    marker: PhantomData<Box<Entry<T>>>,
}

impl<T> List<T> {
    /// Creates a new List that holds at most `cap` items.
    pub fn new(cap: NonZeroUsize) -> List<T> {
        let head = Box::into_raw(Box::new(Entry::new_sigil()));
        let tail = Box::into_raw(Box::new(Entry::new_sigil()));

        unsafe {
            // SAFETY: head and tail are newly allocated and valid pointers
            (*head).next = tail;
            (*tail).prev = head;
        }

        List {
            cap,
            len: 0,
            head,
            tail,
            marker: PhantomData,
        }
    }

    /// Returns the maximum number of items the list can hold.
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the current number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the list is at capacity.
    pub fn is_full(&self) -> bool {
        self.len == self.cap.get()
    }

    /// Returns the oldest value, if any.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is non-empty so head.next is a value node
        unsafe { Some((*(*self.head).next).get_value()) }
    }

    /// Appends a value at the back (newest end) of the list.
    ///
    /// Returns a pointer to the newly created entry, or None if the list is full.
    pub fn push_back(&mut self, v: T) -> Option<*mut Entry<T>> {
        if self.is_full() {
            return None;
        }
        // SAFETY: Box::into_raw never returns null
        let node = unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(Entry::new(v)))) };
        // SAFETY: node is a newly allocated entry that is not part of any list yet
        unsafe { self.attach_last(node.as_ptr()) };
        self.len += 1;
        Some(node.as_ptr())
    }

    /// Removes the oldest value from the list.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is non-empty so head.next is a value node owned by this list
        unsafe {
            let first = (*self.head).next;
            self.remove(first)
        }
    }

    /// Unlinks `node` from the list, frees it and returns its value.
    ///
    /// # Safety
    ///
    /// `node` must be a pointer previously returned by `push_back` on this list
    /// that has not been removed since.
    pub unsafe fn remove(&mut self, node: *mut Entry<T>) -> Option<T> {
        if self.is_empty() || node.is_null() || node == self.head || node == self.tail {
            return None;
        }

        self.detach(node);
        self.len -= 1;

        let boxed = Box::from_raw(node);
        Some(boxed.val.assume_init())
    }

    /// Moves a node to the back (newest end) of the list.
    ///
    /// # Safety
    ///
    /// `node` must point to a live value node of this list.
    pub unsafe fn move_to_back(&mut self, node: *mut Entry<T>) {
        if node.is_null() || node == self.head || node == self.tail {
            return;
        }
        if (*self.tail).prev == node {
            return;
        }

        self.detach(node);
        self.attach_last(node);
    }

    /// Iterates values from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            // SAFETY: head is valid for the lifetime of the list
            next: unsafe { (*self.head).next },
            tail: self.tail,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Removes and drops every value in the list.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// # Safety
    ///
    /// `node` must be a value node currently linked into this list.
    unsafe fn detach(&mut self, node: *mut Entry<T>) {
        (*(*node).prev).next = (*node).next;
        (*(*node).next).prev = (*node).prev;
    }

    /// # Safety
    ///
    /// `node` must be valid and not currently linked into any list.
    unsafe fn attach_last(&mut self, node: *mut Entry<T>) {
        (*node).next = self.tail;
        (*node).prev = (*self.tail).prev;
        (*self.tail).prev = node;
        (*(*node).prev).next = node;
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();

        // SAFETY: head and tail were allocated in `new` and are freed only here
        unsafe {
            drop(Box::from_raw(self.head));
            drop(Box::from_raw(self.tail));
        }
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("capacity", &self.cap)
            .field("length", &self.len)
            .finish()
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    next: *mut Entry<T>,
    tail: *mut Entry<T>,
    remaining: usize,
    marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.next == self.tail || self.remaining == 0 {
            return None;
        }
        // SAFETY: the borrow on the list keeps every node alive and unmodified
        unsafe {
            let node = self.next;
            self.next = (*node).next;
            self.remaining -= 1;
            Some((*node).get_value())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    fn values<T: Clone>(list: &List<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn test_push_back_respects_capacity() {
        let mut list = List::<u32>::new(NonZeroUsize::new(2).unwrap());
        assert!(list.push_back(10).is_some());
        assert!(list.push_back(20).is_some());
        assert!(list.is_full());
        assert!(list.push_back(30).is_none());
        assert_eq!(list.len(), 2);
        assert_eq!(values(&list), [10, 20]);
    }

    #[test]
    fn test_pop_front_returns_oldest() {
        let mut list = List::new(NonZeroUsize::new(3).unwrap());
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_front(), Some(3));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle_node() {
        let mut list = List::new(NonZeroUsize::new(3).unwrap());
        list.push_back(1);
        let middle = list.push_back(2).unwrap();
        list.push_back(3);

        assert_eq!(unsafe { list.remove(middle) }, Some(2));
        assert_eq!(values(&list), [1, 3]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_move_to_back() {
        let mut list = List::new(NonZeroUsize::new(3).unwrap());
        let first = list.push_back(1).unwrap();
        list.push_back(2);
        let last = list.push_back(3).unwrap();

        unsafe { list.move_to_back(first) };
        assert_eq!(values(&list), [2, 3, 1]);

        // Already at the back
        unsafe { list.move_to_back(first) };
        assert_eq!(values(&list), [2, 3, 1]);

        unsafe { list.move_to_back(last) };
        assert_eq!(values(&list), [2, 1, 3]);
    }

    #[test]
    fn test_drop_releases_owned_values() {
        let mut list = List::new(NonZeroUsize::new(4).unwrap());
        for word in ["a", "b", "c"] {
            list.push_back(word.to_string());
        }
        let collected: Vec<String> = values(&list);
        assert_eq!(collected, ["a", "b", "c"]);
        list.clear();
        assert!(list.is_empty());
        list.push_back("d".to_string());
    }
}
