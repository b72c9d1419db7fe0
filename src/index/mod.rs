//! Secondary index structures
//!
//! An index is a sorted array of (key, rowid) pairs over one column,
//! maintained by its owning table and exposed to the iterator layer as a
//! sorted column view.

mod sorted;

pub use sorted::{IdRun, Kv, SortedIndex};
