//! Sorted linked-list sets guarded by coarse-grained locks.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![allow(clippy::result_unit_err)]

pub mod adt;
pub mod list_set;

pub mod lock;
pub mod test;

pub use adt::{ConcurrentSet, SequentialSet};
pub use list_set::{CoarseListSet, RwListSet, SortedListSet};
