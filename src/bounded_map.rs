// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    fmt,
    hash::Hash,
};

use tracing::trace;

use crate::{
    errs::SkipListError,
    preconditions::check_argument,
};

/// A map holding at most `max_size` entries. Once full, every new key pushes
/// out the entry that was inserted the longest time ago.
///
/// Replacing the value of a present key does not count as a new insertion, so
/// the key keeps its place in the eviction order.
pub struct FifoBoundedMap<K, V> {
    entries: HashMap<K, (u64, V)>,
    /// insertion sequence -> key, oldest first
    order: BTreeMap<u64, K>,
    next_seq: u64,
    max_size: usize,
}

impl<K: Hash + Eq + Clone, V> FifoBoundedMap<K, V> {
    pub fn new(max_size: usize) -> Result<Self, SkipListError> {
        check_argument(max_size > 0, "max_size must be positive, got %s", &[&max_size])?;
        Ok(FifoBoundedMap {
            entries: HashMap::with_capacity(max_size),
            order: BTreeMap::new(),
            next_seq: 0,
            max_size,
        })
    }

    /// Build a map bounded by the number of distinct keys in `source`, holding
    /// the same mappings. Later duplicates replace earlier values.
    pub fn from_map<I>(source: I) -> Result<Self, SkipListError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = FifoBoundedMap {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            max_size: usize::MAX,
        };
        for (key, value) in source {
            map.insert(key, value);
        }
        check_argument(
            !map.is_empty(),
            "cannot size a bounded map from an empty source",
            &[],
        )?;
        map.max_size = map.len();
        Ok(map)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_size - self.len()
    }

    /// Insert or replace, returning the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some((_, slot)) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.clone());
        self.entries.insert(key, (seq, value));

        while self.entries.len() > self.max_size {
            self.evict_eldest();
        }
        None
    }

    /// Queue-style insert. There is always room once the eldest is evicted, so
    /// this never refuses.
    pub fn offer(&mut self, key: K, value: V) -> bool {
        self.insert(key, value);
        true
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (seq, value) = self.entries.remove(key)?;
        self.order.remove(&seq);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Entries from the oldest insertion to the newest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order.values().filter_map(move |key| {
            self.entries.get(key).map(|(_, v)| (key, v))
        })
    }

    fn evict_eldest(&mut self) {
        if let Some((_, key)) = self.order.pop_first() {
            self.entries.remove(&key);
            trace!(remaining = self.entries.len(), "evicted eldest entry");
        }
    }
}

impl<K: Hash + Eq + Clone, V> Extend<(K, V)> for FifoBoundedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> fmt::Debug for FifoBoundedMap<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::{
        collection::vec,
        prelude::*,
    };

    use super::FifoBoundedMap;
    use crate::errs::SkipListError;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            FifoBoundedMap::<u32, u32>::new(0),
            Err(SkipListError::InvalidArgument(_))
        ));
        assert!(matches!(
            FifoBoundedMap::<u32, u32>::from_map(Vec::new()),
            Err(SkipListError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_evicts_eldest() {
        let mut map = FifoBoundedMap::new(2).unwrap();
        assert_eq!(map.insert("a", 1), None);
        map.insert("b", 2);
        assert_eq!(map.remaining_capacity(), 0);
        map.insert("c", 3);

        assert_eq!(map.len(), 2);
        assert!(!map.contains_key(&"a"));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"b", &2), (&"c", &3)]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut map = FifoBoundedMap::new(2).unwrap();
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(map.insert(1, "uno"), Some("one"));
        map.insert(3, "three");

        assert_eq!(map.get(&1), None);
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&3), Some(&"three"));
    }

    #[test]
    fn test_remove_frees_room() {
        let mut map = FifoBoundedMap::new(2).unwrap();
        map.extend([(1, 10), (2, 20)]);
        assert_eq!(map.remove(&1), Some(10));
        assert_eq!(map.remove(&1), None);
        assert!(map.offer(3, 30));
        assert_eq!(map.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![2, 3]);

        if let Some(v) = map.get_mut(&2) {
            *v += 1;
        }
        assert_eq!(map.get(&2), Some(&21));

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.remaining_capacity(), 2);
    }

    #[test]
    fn test_from_map() {
        let map = FifoBoundedMap::from_map([("x", 1), ("y", 2), ("x", 3)]).unwrap();
        assert_eq!(map.max_size(), 2);
        assert_eq!(map.get(&"x"), Some(&3));
        assert_eq!(format!("{:?}", map), r#"{"x": 3, "y": 2}"#);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(cap in 1usize..8, keys in vec(0u8..16, 0..64)) {
            let mut map = FifoBoundedMap::new(cap).unwrap();
            for (i, key) in keys.iter().enumerate() {
                map.insert(*key, i);
                prop_assert!(map.len() <= cap);
                prop_assert_eq!(map.get(key), Some(&i));
            }
        }
    }
}
