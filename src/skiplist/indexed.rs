// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    cmp::Ordering,
    fmt,
};

use tracing::{
    instrument,
    trace,
};

use crate::{
    config::{
        SkipListConfig,
        MAX_LEVEL,
    },
    errs::SkipListError,
    preconditions::{
        check_element_index,
        check_not_null,
        check_position_index,
    },
    skiplist::{
        comparator::{
            Comparator,
            Natural,
            SortedSource,
        },
        iter::{
            Cursor,
            IntoIter,
            Iter,
        },
        level_generator::{
            GeometricalLevelGenerator,
            LevelGenerator,
        },
        node::{
            Arena,
            NodeId,
            HEAD,
        },
    },
};

/// A sorted list with `O(log n)` expected insertion, removal, membership and
/// access by index.
///
/// Elements are kept from least to greatest according to the list's
/// [`Comparator`]. Elements that compare equal are kept next to each other; a
/// new element is placed in front of the elements it is equal to.
///
/// Every lane is a circular list through the sentinel, and every link carries
/// the number of lane-0 positions it jumps over. Summing those spans while
/// descending the lanes is what makes rank lookups logarithmic.
///
/// The list is not synchronized. Wrap it in a lock if several threads need it.
pub struct IndexedSkipList<T, C = Natural> {
    arena: Arena<T>,
    len: usize,
    /// Number of lanes in use, never zero.
    level: usize,
    mod_count: u64,
    config: SkipListConfig,
    level_generator: GeometricalLevelGenerator,
    comparator: C,
}

/// Predecessors at every lane, plus their position (the sentinel sits at
/// position 0, the first element at position 1).
type Path = ([NodeId; MAX_LEVEL], [usize; MAX_LEVEL]);

impl<T: Ord> IndexedSkipList<T, Natural> {
    /// Create an empty list ordered by `T`'s natural ordering.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<T: Ord> Default for IndexedSkipList<T, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> IndexedSkipList<T, C> {
    /// Create an empty list ordered by `comparator`.
    pub fn with_comparator(comparator: C) -> Self {
        Self::build(SkipListConfig::default(), comparator, 0)
    }

    /// Create an empty list with explicit level settings.
    #[instrument(level = "debug", skip(comparator))]
    pub fn with_config(config: SkipListConfig, comparator: C) -> Result<Self, SkipListError> {
        config.validate()?;
        Ok(Self::build(config, comparator, 0))
    }

    /// Create a list holding the elements of `source`, ordered the same way
    /// `source` orders them.
    pub fn from_sorted<S>(source: &S) -> Self
    where
        T: Clone,
        S: SortedSource<T, Comparator = C>,
        for<'a> &'a S: IntoIterator<Item = &'a T>,
    {
        let mut list = Self::with_comparator(source.source_comparator());
        list.extend(source.into_iter().cloned());
        list
    }

    pub(crate) fn build(config: SkipListConfig, comparator: C, capacity: usize) -> Self {
        IndexedSkipList {
            arena: Arena::with_capacity(config.max_level(), capacity),
            len: 0,
            level: 1,
            mod_count: 0,
            level_generator: GeometricalLevelGenerator::from_config(&config),
            config,
            comparator,
        }
    }

    /// The ordering used by this list.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    #[inline]
    pub fn config(&self) -> &SkipListConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every element.
    #[instrument(level = "debug", skip(self), fields(len = self.len))]
    pub fn clear(&mut self) {
        self.arena.reset(self.config.max_level());
        self.len = 0;
        self.level = 1;
        self.mod_count += 1;
    }

    /// Insert `value` in sorted order. Duplicates are allowed.
    pub fn insert(&mut self, value: T) {
        let (mut update, mut ranks) = self.path_to(&value);
        // position of the lane-0 predecessor; the new node lands right after it
        let rank = ranks[0];

        let new_level = self.level_generator.random();
        if new_level > self.level {
            for lane in self.level..new_level {
                self.arena.get_mut(HEAD).span[lane] = self.len + 1;
                update[lane] = HEAD;
                ranks[lane] = 0;
            }
            trace!(from = self.level, to = new_level, "raising active lanes");
            self.level = new_level;
        }

        let node = self.arena.alloc(value, new_level);
        for lane in 0..self.level {
            let pred = update[lane];
            if lane < new_level {
                let (pred_next, pred_span) = {
                    let p = self.arena.get(pred);
                    (p.next[lane], p.span[lane])
                };
                let n = self.arena.get_mut(node);
                n.next[lane] = pred_next;
                n.span[lane] = ranks[lane] + pred_span - rank;
                let p = self.arena.get_mut(pred);
                p.next[lane] = node;
                p.span[lane] = rank + 1 - ranks[lane];
            } else {
                // not promoted this high, but the link above still jumps over it
                self.arena.get_mut(pred).span[lane] += 1;
            }
        }

        let next = self.arena.get(node).next[0];
        self.arena.get_mut(node).prev = update[0];
        self.arena.get_mut(next).prev = node;

        self.mod_count += 1;
        self.len += 1;
    }

    /// Insert an element that may be missing. `None` is rejected before the
    /// list is touched.
    pub fn try_insert(&mut self, value: Option<T>) -> Result<(), SkipListError> {
        let value = check_not_null(value, "cannot insert a missing element", &[])?;
        self.insert(value);
        Ok(())
    }

    /// Whether an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// The element at `index` in sorted order.
    pub fn get(&self, index: usize) -> Result<&T, SkipListError> {
        check_element_index(index, self.len)?;
        Ok(self.arena.element(self.node_at(index)))
    }

    pub fn first(&self) -> Option<&T> {
        match self.arena.get(HEAD).next[0] {
            | HEAD => None,
            | id => Some(self.arena.element(id)),
        }
    }

    pub fn last(&self) -> Option<&T> {
        match self.arena.get(HEAD).prev {
            | HEAD => None,
            | id => Some(self.arena.element(id)),
        }
    }

    /// Rank of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        let (update, ranks) = self.path_to(value);
        let next = self.arena.get(update[0]).next[0];
        if next != HEAD && self.comparator.compare(self.arena.element(next), value) == Ordering::Equal
        {
            Some(ranks[0])
        } else {
            None
        }
    }

    /// Rank of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize> {
        let mut curr = HEAD;
        let mut rank = 0;
        for lane in (0..self.level).rev() {
            loop {
                let node = self.arena.get(curr);
                let next = node.next[lane];
                if next == HEAD
                    || self.comparator.compare(self.arena.element(next), value) == Ordering::Greater
                {
                    break;
                }
                rank += node.span[lane];
                curr = next;
            }
        }

        if curr != HEAD && self.comparator.compare(self.arena.element(curr), value) == Ordering::Equal
        {
            Some(rank - 1)
        } else {
            None
        }
    }

    /// Remove the first element equal to `value`, handing it back.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let (update, _) = self.path_to(value);
        let target = self.arena.get(update[0]).next[0];
        if target == HEAD
            || self.comparator.compare(self.arena.element(target), value) != Ordering::Equal
        {
            return None;
        }
        Some(self.unlink(target, &update))
    }

    /// Remove the element at `index`, handing it back.
    pub fn remove_at(&mut self, index: usize) -> Result<T, SkipListError> {
        check_element_index(index, self.len)?;

        let mut update = [HEAD; MAX_LEVEL];
        let mut curr = HEAD;
        let mut pos = 0;
        for lane in (0..self.level).rev() {
            loop {
                let node = self.arena.get(curr);
                if pos + node.span[lane] > index {
                    break;
                }
                pos += node.span[lane];
                curr = node.next[lane];
            }
            update[lane] = curr;
        }

        let target = self.arena.get(curr).next[0];
        Ok(self.unlink(target, &update))
    }

    pub fn pop_first(&mut self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            self.remove_at(0).ok()
        }
    }

    pub fn pop_last(&mut self) -> Option<T> {
        match self.len {
            | 0 => None,
            | len => self.remove_at(len - 1).ok(),
        }
    }

    /// Iterate the elements from least to greatest.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter::new(self, self.arena.get(HEAD).next[0], self.len)
    }

    /// Iterate starting at `index`. `index == len()` yields an empty iterator.
    pub fn iter_from(&self, index: usize) -> Result<Iter<'_, T, C>, SkipListError> {
        check_position_index(index, self.len)?;
        let start = if index == self.len {
            HEAD
        } else {
            self.node_at(index)
        };
        Ok(Iter::new(self, start, self.len - index))
    }

    /// A detached cursor positioned before the first element.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.arena.get(HEAD).next[0], 0, self.mod_count)
    }

    /// A detached cursor positioned before the element at `index`.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor, SkipListError> {
        check_position_index(index, self.len)?;
        let start = if index == self.len {
            HEAD
        } else {
            self.node_at(index)
        };
        Ok(Cursor::new(start, index, self.mod_count))
    }

    #[inline]
    pub(crate) fn arena(&self) -> &Arena<T> {
        &self.arena
    }

    #[inline]
    pub(crate) fn mod_count(&self) -> u64 {
        self.mod_count
    }

    /// Hand the elements over in sorted order, consuming the list.
    pub(crate) fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        let mut curr = self.arena.get(HEAD).next[0];
        while curr != HEAD {
            let next = self.arena.get(curr).next[0];
            if let Some(element) = self.arena.take(curr) {
                out.push(element);
            }
            curr = next;
        }
        out
    }

    /// Walk down the lanes to the last node strictly less than `value`.
    fn path_to(&self, value: &T) -> Path {
        let mut update = [HEAD; MAX_LEVEL];
        let mut ranks = [0; MAX_LEVEL];
        let mut curr = HEAD;
        let mut rank = 0;
        for lane in (0..self.level).rev() {
            loop {
                let node = self.arena.get(curr);
                let next = node.next[lane];
                if next == HEAD
                    || self.comparator.compare(self.arena.element(next), value) != Ordering::Less
                {
                    break;
                }
                rank += node.span[lane];
                curr = next;
            }
            update[lane] = curr;
            ranks[lane] = rank;
        }
        (update, ranks)
    }

    fn find(&self, value: &T) -> Option<NodeId> {
        let mut curr = HEAD;
        for lane in (0..self.level).rev() {
            loop {
                let next = self.arena.get(curr).next[lane];
                if next == HEAD
                    || self.comparator.compare(self.arena.element(next), value) != Ordering::Less
                {
                    break;
                }
                curr = next;
            }
        }

        let next = self.arena.get(curr).next[0];
        if next != HEAD && self.comparator.compare(self.arena.element(next), value) == Ordering::Equal
        {
            Some(next)
        } else {
            None
        }
    }

    /// The node at rank `index`, which must be in bounds.
    pub(crate) fn node_at(&self, index: usize) -> NodeId {
        let target = index + 1;
        let mut curr = HEAD;
        let mut pos = 0;
        for lane in (0..self.level).rev() {
            loop {
                let node = self.arena.get(curr);
                if pos + node.span[lane] > target {
                    break;
                }
                pos += node.span[lane];
                curr = node.next[lane];
            }
        }
        curr
    }

    /// Splice `target` out of every lane. `update` holds its predecessor at
    /// each active lane.
    fn unlink(&mut self, target: NodeId, update: &[NodeId; MAX_LEVEL]) -> T {
        for lane in 0..self.level {
            let pred = update[lane];
            if self.arena.get(pred).next[lane] == target {
                let (target_next, target_span) = {
                    let t = self.arena.get(target);
                    (t.next[lane], t.span[lane])
                };
                let p = self.arena.get_mut(pred);
                p.next[lane] = target_next;
                p.span[lane] += target_span - 1;
            } else {
                self.arena.get_mut(pred).span[lane] -= 1;
            }
        }

        let (prev, next) = {
            let t = self.arena.get(target);
            (t.prev, t.next[0])
        };
        self.arena.get_mut(next).prev = prev;

        let before = self.level;
        while self.level > 1 && self.arena.get(HEAD).next[self.level - 1] == HEAD {
            self.level -= 1;
        }
        if before != self.level {
            trace!(from = before, to = self.level, "lowering active lanes");
        }

        self.mod_count += 1;
        self.len -= 1;
        self.arena.release(target)
    }
}

impl<T, C> SortedSource<T> for IndexedSkipList<T, C>
where
    C: Comparator<T> + Clone,
{
    type Comparator = C;

    fn source_comparator(&self) -> C {
        self.comparator.clone()
    }
}

/// A shallow copy: the copy gets its own sentinel and level generator and the
/// elements are cloned into it through the normal insertion path.
impl<T, C> Clone for IndexedSkipList<T, C>
where
    T: Clone,
    C: Comparator<T> + Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::build(self.config, self.comparator.clone(), self.len);
        // back to front, so that equal elements keep their relative order
        for element in self.iter().rev() {
            copy.insert(element.clone());
        }
        copy
    }
}

impl<T, C: Comparator<T>> Extend<T> for IndexedSkipList<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Ord> FromIterator<T> for IndexedSkipList<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a IndexedSkipList<T, C> {
    type IntoIter = Iter<'a, T, C>;
    type Item = &'a T;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C: Comparator<T>> IntoIterator for IndexedSkipList<T, C> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.into_sorted_vec())
    }
}

impl<T, C, D> PartialEq<IndexedSkipList<T, D>> for IndexedSkipList<T, C>
where
    T: PartialEq,
    C: Comparator<T>,
    D: Comparator<T>,
{
    fn eq(&self, other: &IndexedSkipList<T, D>) -> bool {
        self.len == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C: Comparator<T>> Eq for IndexedSkipList<T, C> {}

impl<T: fmt::Debug, C: Comparator<T>> fmt::Debug for IndexedSkipList<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
impl<T, C: Comparator<T>> IndexedSkipList<T, C> {
    /// Walk every active lane and verify ordering, spans, back links and the
    /// lane bookkeeping.
    pub(crate) fn check_invariants(&self) {
        let head = self.arena.get(HEAD);
        assert!(self.level >= 1 && self.level < self.config.max_level());
        assert_eq!(head.level(), self.config.max_level());
        assert_eq!(self.arena.live(), self.len + 1, "leaked or lost nodes");

        // lane 0: ordering, size, back links
        let mut count = 0;
        let mut prev = HEAD;
        let mut curr = head.next[0];
        while curr != HEAD {
            let node = self.arena.get(curr);
            assert_eq!(node.prev, prev, "broken back link at node {}", curr);
            assert!(node.level() >= 1 && node.level() <= self.level);
            if prev != HEAD {
                assert_ne!(
                    self.comparator
                        .compare(self.arena.element(prev), self.arena.element(curr)),
                    Ordering::Greater,
                    "lane 0 out of order"
                );
            }
            count += 1;
            prev = curr;
            curr = node.next[0];
        }
        assert_eq!(head.prev, prev, "sentinel does not point back at the tail");
        assert_eq!(count, self.len);

        // every active lane spans exactly len + 1 positions
        for lane in 0..self.level {
            let mut total = 0;
            let mut curr = HEAD;
            loop {
                let node = self.arena.get(curr);
                assert!(node.span[lane] >= 1);
                total += node.span[lane];
                curr = node.next[lane];
                if curr == HEAD {
                    break;
                }
            }
            assert_eq!(total, self.len + 1, "span sum broken in lane {}", lane);
        }

        // the topmost active lane is never empty, unless it is lane 0
        if self.level > 1 {
            assert_ne!(head.next[self.level - 1], HEAD, "empty lane left active");
        }
    }
}
