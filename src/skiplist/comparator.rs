// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    cmp::Ordering,
    collections::{
        BTreeSet,
        BinaryHeap,
    },
};

/// A total order over `T`.
///
/// The list only ever looks at the result of `compare`, so two elements the
/// comparator reports as `Equal` are interchangeable as far as the list is
/// concerned, whatever their `PartialEq` says. The function **must** be
/// consistent, anti-symmetric and transitive.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The natural ordering of an [`Ord`] type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Flips the wrapped ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reverse<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// A collection that already knows how its elements are ordered.
///
/// Building a list from one of these adopts the source's ordering instead of
/// falling back to the natural one. The set of sources is closed: the std
/// sorted collections plus [`IndexedSkipList`](super::IndexedSkipList) itself.
pub trait SortedSource<T> {
    type Comparator: Comparator<T> + Clone;

    fn source_comparator(&self) -> Self::Comparator;
}

impl<T: Ord> SortedSource<T> for BTreeSet<T> {
    type Comparator = Natural;

    fn source_comparator(&self) -> Natural {
        Natural
    }
}

impl<T: Ord> SortedSource<T> for BinaryHeap<T> {
    type Comparator = Natural;

    fn source_comparator(&self) -> Natural {
        Natural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Natural.compare("b", "a"), Ordering::Greater);
        assert_eq!(Natural.compare(&7u8, &7u8), Ordering::Equal);
    }

    #[test]
    fn test_reverse() {
        let cmp = Reverse(Natural);
        assert_eq!(cmp.compare(&1, &2), Ordering::Greater);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
    }

    #[test]
    fn test_closure() {
        let by_len = |a: &String, b: &String| a.len().cmp(&b.len());
        assert_eq!(
            by_len.compare(&"ab".to_string(), &"xy".to_string()),
            Ordering::Equal
        );
        assert_eq!(
            Reverse(by_len).compare(&"a".to_string(), &"xyz".to_string()),
            Ordering::Greater
        );
    }

    #[test]
    fn test_float_total_order() {
        let cmp = f64::total_cmp;
        assert_eq!(cmp.compare(&1.5, &f64::NAN), Ordering::Less);
        assert_eq!(cmp.compare(&-0.0, &0.0), Ordering::Less);
    }
}
