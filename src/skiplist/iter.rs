// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    iter::FusedIterator,
    vec,
};

use crate::{
    errs::SkipListError,
    skiplist::{
        comparator::Comparator,
        node::{
            NodeId,
            HEAD,
        },
        IndexedSkipList,
    },
};

/// A borrowing iterator over the elements of a list, in sorted order. It can
/// be walked from either end.
pub struct Iter<'a, T, C> {
    list: &'a IndexedSkipList<T, C>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, T, C: Comparator<T>> Iter<'a, T, C> {
    pub(crate) fn new(list: &'a IndexedSkipList<T, C>, front: NodeId, remaining: usize) -> Self {
        Iter {
            list,
            front,
            back: list.arena().get(HEAD).prev,
            remaining,
        }
    }
}

impl<'a, T, C> Clone for Iter<'a, T, C> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, C: Comparator<T>> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let arena = self.list.arena();
        let current = self.front;
        self.front = arena.get(current).next[0];
        self.remaining -= 1;
        Some(arena.element(current))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, C: Comparator<T>> DoubleEndedIterator for Iter<'a, T, C> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let arena = self.list.arena();
        let current = self.back;
        self.back = arena.get(current).prev;
        self.remaining -= 1;
        Some(arena.element(current))
    }
}

impl<'a, T, C: Comparator<T>> ExactSizeIterator for Iter<'a, T, C> {}

impl<'a, T, C: Comparator<T>> FusedIterator for Iter<'a, T, C> {}

/// An owning iterator, produced by consuming a list.
#[derive(Debug)]
pub struct IntoIter<T> {
    inner: vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(sorted: Vec<T>) -> Self {
        IntoIter {
            inner: sorted.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

/// A bidirectional position in a list that does not hold a borrow of it.
///
/// Because the cursor is detached, the list stays free to change between
/// steps. The cursor remembers the list's modification count when it was
/// created, and every step fails with
/// [`SkipListError::ConcurrentModification`] once the list has been changed.
/// It never resynchronizes; create a new cursor instead.
///
/// A cursor must only be used with the list that created it.
#[derive(Clone, Debug)]
pub struct Cursor {
    /// The node `next` would return.
    node: NodeId,
    /// Rank of that node.
    position: usize,
    expected_mod_count: u64,
}

impl Cursor {
    pub(crate) fn new(node: NodeId, position: usize, expected_mod_count: u64) -> Self {
        Cursor {
            node,
            position,
            expected_mod_count,
        }
    }

    pub fn has_next<T, C: Comparator<T>>(&self, list: &IndexedSkipList<T, C>) -> bool {
        self.position < list.len()
    }

    pub fn has_previous(&self) -> bool {
        self.position > 0
    }

    /// Rank of the element `next` would return.
    pub fn next_index(&self) -> usize {
        self.position
    }

    /// Rank of the element `previous` would return.
    pub fn previous_index(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    pub fn next<'a, T, C: Comparator<T>>(
        &mut self,
        list: &'a IndexedSkipList<T, C>,
    ) -> Result<&'a T, SkipListError> {
        self.check_for_comodification(list)?;
        if !self.has_next(list) {
            return Err(SkipListError::NoSuchElement);
        }
        let arena = list.arena();
        let current = self.node;
        self.node = arena.get(current).next[0];
        self.position += 1;
        Ok(arena.element(current))
    }

    pub fn previous<'a, T, C: Comparator<T>>(
        &mut self,
        list: &'a IndexedSkipList<T, C>,
    ) -> Result<&'a T, SkipListError> {
        self.check_for_comodification(list)?;
        if !self.has_previous() {
            return Err(SkipListError::NoSuchElement);
        }
        let arena = list.arena();
        self.node = arena.get(self.node).prev;
        self.position -= 1;
        Ok(arena.element(self.node))
    }

    fn check_for_comodification<T, C: Comparator<T>>(
        &self,
        list: &IndexedSkipList<T, C>,
    ) -> Result<(), SkipListError> {
        let found = list.mod_count();
        if found != self.expected_mod_count {
            return Err(SkipListError::ConcurrentModification {
                expected: self.expected_mod_count,
                found,
            });
        }
        Ok(())
    }
}
