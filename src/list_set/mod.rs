//! Sorted linked-list sets.

mod coarse;
mod rw;
mod sorted;

pub use coarse::CoarseListSet;
pub use rw::RwListSet;
pub use sorted::{Iter, SortedListSet};
