// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! A sorted collection with positional access.
//!
//! [`IndexedSkipList`] keeps its elements ordered by a [`Comparator`] and, on
//! top of the usual skip list operations, answers "what is the element at rank
//! `i`" and "what rank does this element have" in expected `O(log n)` time.
//!
//! ```
//! use indexed_skiplist::IndexedSkipList;
//!
//! let mut list: IndexedSkipList<i32> = [5, -3, 17, -9, 4, 6].into_iter().collect();
//! list.insert(4);
//!
//! assert_eq!(list.get(3).unwrap(), &4);
//! assert_eq!(list.index_of(&17), Some(6));
//! assert_eq!(list.remove_at(0).unwrap(), -9);
//! ```

/// The configuration knobs for a list's level distribution.
pub mod config;
/// A small insertion-ordered map with a hard size limit.
pub mod bounded_map;
pub mod encoding;
pub mod errs;
/// Argument checks that produce [`SkipListError`] values.
pub mod preconditions;
/// The indexed [`skip list`] itself.
///
/// [`skip list`]: https://en.wikipedia.org/wiki/Skip_list
pub mod skiplist;

pub use bounded_map::FifoBoundedMap;
pub use config::SkipListConfig;
pub use errs::SkipListError;
pub use skiplist::{
    Comparator,
    Cursor,
    IndexedSkipList,
    Natural,
    Reverse,
};
