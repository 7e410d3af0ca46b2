// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! A skiplist which allows random access by rank in logarithmic time, where a
//! standard linked list needs linear time.
//!
//! SkipLists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `n > 0` will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level `n` is `p` times the chance of occupying level `n-1`
//! (with `0 < p < 1`).
//!
//! On top of the usual forward links, every link here records how many
//! elements it skips. Adding up those counts while searching yields the rank
//! of whatever the search lands on, and the reverse walk finds the element at
//! a given rank.
//!
//! It is very unlikely that the level distribution will need to be changed as
//! the default should suffice, but it can be tuned through
//! [`SkipListConfig`](crate::config::SkipListConfig).

pub mod comparator;
mod indexed;
pub mod iter;
mod level_generator;
mod node;
mod persist;

pub use comparator::{
    Comparator,
    Natural,
    Reverse,
    SortedSource,
};
pub use indexed::IndexedSkipList;
pub use iter::{
    Cursor,
    IntoIter,
    Iter,
};
pub use level_generator::{
    GeometricalLevelGenerator,
    LevelGenerator,
};
