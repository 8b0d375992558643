use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr;

use crate::SequentialSet;

/// Key slot of a node. The sentinels order below and above every real key, so no value of `T`
/// has to be reserved for them.
#[derive(Debug)]
enum Bound<T> {
    Min,
    Key(T),
    Max,
}

impl<T: Ord> Bound<T> {
    /// Whether the slot orders strictly before `key`.
    fn precedes(&self, key: &T) -> bool {
        match self {
            Bound::Min => true,
            Bound::Key(k) => k < key,
            Bound::Max => false,
        }
    }

    fn holds(&self, key: &T) -> bool {
        matches!(self, Bound::Key(k) if k == key)
    }
}

#[derive(Debug)]
struct Node<T> {
    key: Bound<T>,
    next: *mut Node<T>,
}

impl<T> Node<T> {
    fn new(key: Bound<T>, next: *mut Self) -> *mut Self {
        Box::into_raw(Box::new(Self { key, next }))
    }
}

/// Sorted singly linked list bounded by a min and a max sentinel.
///
/// Keys between the sentinels are unique and strictly ascending. The list itself is not
/// synchronized; see [`CoarseListSet`](crate::CoarseListSet) and [`RwListSet`](crate::RwListSet)
/// for the shared versions.
pub struct SortedListSet<T> {
    /// The min sentinel. The chain from here always ends at the max sentinel.
    head: *mut Node<T>,
    len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

unsafe impl<T: Send> Send for SortedListSet<T> {}
unsafe impl<T: Sync> Sync for SortedListSet<T> {}

// pred -> curr, with pred.key < key <= curr.key
struct Cursor<T> {
    prev: *mut Node<T>,
    curr: *mut Node<T>,
}

impl<T> SortedListSet<T> {
    /// Creates an empty list: the two sentinels linked to each other.
    pub fn new() -> Self {
        let tail = Node::new(Bound::Max, ptr::null_mut());
        Self {
            head: Node::new(Bound::Min, tail),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Number of keys in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if only the sentinels are left.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// An iterator visiting all keys in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            // SAFETY: `head` is the live min sentinel.
            curr: unsafe { (*self.head).next },
            _marker: PhantomData,
        }
    }
}

impl<T: Ord> SortedListSet<T> {
    /// Walks from the min sentinel to the first node whose key is not below `key`.
    fn locate(&self, key: &T) -> Cursor<T> {
        // SAFETY: every node reachable from `head` is live and owned by `self`. The max sentinel
        // never precedes a key, so the walk stops before `next` can be null.
        unsafe {
            let mut prev = self.head;
            let mut curr = (*prev).next;
            while (*curr).key.precedes(key) {
                prev = curr;
                curr = (*curr).next;
            }
            Cursor { prev, curr }
        }
    }
}

impl<T: Ord> SequentialSet<T> for SortedListSet<T> {
    fn contains(&self, key: &T) -> bool {
        let cursor = self.locate(key);
        // SAFETY: `locate` returns live nodes.
        unsafe { (*cursor.curr).key.holds(key) }
    }

    fn insert(&mut self, key: T) -> bool {
        let Cursor { prev, curr } = self.locate(&key);
        // SAFETY: `locate` returns adjacent live nodes and `&mut self` rules out other accesses.
        // The list is only written after every comparison has returned.
        unsafe {
            if (*curr).key.holds(&key) {
                return false;
            }
            (*prev).next = Node::new(Bound::Key(key), curr);
        }
        self.len += 1;
        true
    }

    fn remove(&mut self, key: &T) -> bool {
        let Cursor { prev, curr } = self.locate(key);
        // SAFETY: as in `insert`. `curr` holds a real key, so it is not a sentinel and once
        // unlinked nothing else points to it.
        unsafe {
            if !(*curr).key.holds(key) {
                return false;
            }
            (*prev).next = (*curr).next;
            self.len -= 1;
            drop(Box::from_raw(curr));
        }
        true
    }
}

impl<T> Drop for SortedListSet<T> {
    fn drop(&mut self) {
        let mut curr = self.head;
        while !curr.is_null() {
            // SAFETY: every node, sentinels included, was allocated by `Node::new` and is owned by
            // exactly one link.
            let node = unsafe { Box::from_raw(curr) };
            curr = node.next;
        }
    }
}

impl<T> Default for SortedListSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedListSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> Extend<T> for SortedListSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            let _ = self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for SortedListSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'l, T> IntoIterator for &'l SortedListSet<T> {
    type Item = &'l T;
    type IntoIter = Iter<'l, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the keys of a [`SortedListSet`].
#[derive(Debug)]
pub struct Iter<'l, T> {
    curr: *const Node<T>,
    _marker: PhantomData<&'l T>,
}

impl<'l, T> Iterator for Iter<'l, T> {
    type Item = &'l T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the iterator borrows the list, so every node stays alive and unchanged. It stops
        // at the max sentinel and never steps past it.
        let node = unsafe { &*self.curr };
        match &node.key {
            Bound::Key(key) => {
                self.curr = node.next;
                Some(key)
            }
            Bound::Min | Bound::Max => None,
        }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}
