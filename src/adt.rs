//! Abstract data types.

use std::collections::BTreeSet;

/// Sequential set.
pub trait SequentialSet<T> {
    /// Returns `true` iff the set contains `key`.
    fn contains(&self, key: &T) -> bool;

    /// Inserts `key`. Returns `false` and leaves the set untouched if it was already present.
    fn insert(&mut self, key: T) -> bool;

    /// Removes `key`. Returns `false` if it was absent.
    fn remove(&mut self, key: &T) -> bool;
}

/// Concurrent set.
///
/// Every operation is linearizable: it appears to take effect atomically at some instant between
/// its invocation and its return.
pub trait ConcurrentSet<T> {
    /// Returns `true` iff the set contains `key`.
    fn contains(&self, key: &T) -> bool;

    /// Inserts `key`. Returns `false` and leaves the set untouched if it was already present.
    fn insert(&self, key: T) -> bool;

    /// Removes `key`. Returns `false` if it was absent.
    fn remove(&self, key: &T) -> bool;
}

impl<T: Ord> SequentialSet<T> for BTreeSet<T> {
    fn contains(&self, key: &T) -> bool {
        BTreeSet::contains(self, key)
    }

    fn insert(&mut self, key: T) -> bool {
        BTreeSet::insert(self, key)
    }

    fn remove(&mut self, key: &T) -> bool {
        BTreeSet::remove(self, key)
    }
}
