use core::any::type_name;
use core::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use super::SortedListSet;
use crate::lock::{Lock, LockError, RawLock, RawTryLock, SpinLock};
use crate::{ConcurrentSet, SequentialSet};

/// Concurrent sorted singly linked list guarded by a single lock.
///
/// Every operation holds the lock for its whole duration, so operations are totally ordered by
/// lock acquisition.
pub struct CoarseListSet<T, L: RawLock = SpinLock> {
    inner: Lock<L, SortedListSet<T>>,
}

impl<T, L: RawLock> CoarseListSet<T, L> {
    /// Creates a new list.
    pub fn new() -> Self {
        Self::with_list(SortedListSet::new())
    }

    fn with_list(list: SortedListSet<T>) -> Self {
        debug!(lock = type_name::<L>(), "created coarse list set");
        Self {
            inner: Lock::new(list),
        }
    }

    /// Number of keys, as seen at the moment the lock was held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the set held no keys at the moment the lock was held.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copies out the keys in ascending order, all read under one acquisition.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.lock().iter().cloned().collect()
    }

    /// Unwraps the underlying list.
    pub fn into_inner(self) -> SortedListSet<T> {
        self.inner.into_inner()
    }
}

impl<T: Ord, L: RawTryLock> CoarseListSet<T, L> {
    /// [`ConcurrentSet::contains`], giving up once `timeout` has elapsed.
    pub fn contains_timeout(&self, key: &T, timeout: Duration) -> Result<bool, LockError> {
        Ok(self.inner.lock_timeout(timeout)?.contains(key))
    }

    /// [`ConcurrentSet::insert`], giving up once `timeout` has elapsed. On timeout `key` is
    /// dropped and the set is untouched.
    pub fn insert_timeout(&self, key: T, timeout: Duration) -> Result<bool, LockError> {
        let inserted = self.inner.lock_timeout(timeout)?.insert(key);
        trace!(inserted, "insert");
        Ok(inserted)
    }

    /// [`ConcurrentSet::remove`], giving up once `timeout` has elapsed.
    pub fn remove_timeout(&self, key: &T, timeout: Duration) -> Result<bool, LockError> {
        let removed = self.inner.lock_timeout(timeout)?.remove(key);
        trace!(removed, "remove");
        Ok(removed)
    }
}

impl<T: Ord, L: RawLock> ConcurrentSet<T> for CoarseListSet<T, L> {
    fn contains(&self, key: &T) -> bool {
        self.inner.lock().contains(key)
    }

    fn insert(&self, key: T) -> bool {
        let inserted = self.inner.lock().insert(key);
        trace!(inserted, "insert");
        inserted
    }

    fn remove(&self, key: &T) -> bool {
        let removed = self.inner.lock().remove(key);
        trace!(removed, "remove");
        removed
    }
}

impl<T, L: RawLock> Default for CoarseListSet<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, L: RawLock> FromIterator<T> for CoarseListSet<T, L> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_list(iter.into_iter().collect())
    }
}

impl<T, L: RawLock> fmt::Debug for CoarseListSet<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoarseListSet")
            .field("lock", &type_name::<L>())
            .finish_non_exhaustive()
    }
}
