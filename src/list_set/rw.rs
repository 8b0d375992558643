use core::any::type_name;
use core::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use super::SortedListSet;
use crate::lock::{LockError, RawRwLock, RwLock, RwSpinLock};
use crate::{ConcurrentSet, SequentialSet};

/// Concurrent sorted singly linked list guarded by a reader-writer lock.
///
/// `contains` holds the lock in shared mode, so lookups run in parallel with each other. `insert`
/// and `remove` hold it exclusively for their whole duration.
pub struct RwListSet<T, L: RawRwLock = RwSpinLock> {
    inner: RwLock<L, SortedListSet<T>>,
}

impl<T, L: RawRwLock> RwListSet<T, L> {
    /// Creates a new list.
    pub fn new() -> Self {
        Self::with_list(SortedListSet::new())
    }

    fn with_list(list: SortedListSet<T>) -> Self {
        debug!(lock = type_name::<L>(), "created reader-writer list set");
        Self {
            inner: RwLock::new(list),
        }
    }

    /// Number of keys, as seen under a shared acquisition.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the set held no keys under a shared acquisition.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copies out the keys in ascending order, all read under one shared acquisition.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.read().iter().cloned().collect()
    }

    /// Unwraps the underlying list.
    pub fn into_inner(self) -> SortedListSet<T> {
        self.inner.into_inner()
    }
}

impl<T: Ord, L: RawRwLock> RwListSet<T, L> {
    /// [`ConcurrentSet::contains`], giving up once `timeout` has elapsed.
    pub fn contains_timeout(&self, key: &T, timeout: Duration) -> Result<bool, LockError> {
        Ok(self.inner.read_timeout(timeout)?.contains(key))
    }

    /// [`ConcurrentSet::insert`], giving up once `timeout` has elapsed. On timeout `key` is
    /// dropped and the set is untouched.
    pub fn insert_timeout(&self, key: T, timeout: Duration) -> Result<bool, LockError> {
        let inserted = self.inner.write_timeout(timeout)?.insert(key);
        trace!(inserted, "insert");
        Ok(inserted)
    }

    /// [`ConcurrentSet::remove`], giving up once `timeout` has elapsed.
    pub fn remove_timeout(&self, key: &T, timeout: Duration) -> Result<bool, LockError> {
        let removed = self.inner.write_timeout(timeout)?.remove(key);
        trace!(removed, "remove");
        Ok(removed)
    }
}

impl<T: Ord, L: RawRwLock> ConcurrentSet<T> for RwListSet<T, L> {
    fn contains(&self, key: &T) -> bool {
        self.inner.read().contains(key)
    }

    fn insert(&self, key: T) -> bool {
        let inserted = self.inner.write().insert(key);
        trace!(inserted, "insert");
        inserted
    }

    fn remove(&self, key: &T) -> bool {
        let removed = self.inner.write().remove(key);
        trace!(removed, "remove");
        removed
    }
}

impl<T, L: RawRwLock> Default for RwListSet<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, L: RawRwLock> FromIterator<T> for RwListSet<T, L> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_list(iter.into_iter().collect())
    }
}

impl<T, L: RawRwLock> fmt::Debug for RwListSet<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwListSet")
            .field("lock", &type_name::<L>())
            .finish_non_exhaustive()
    }
}
