//! Operator and conversion sugar over `put`/`remove`.

use std::collections::HashSet;
use std::hash::BuildHasher;
use std::ops::{AddAssign, SubAssign};

use crate::capacity::DEFAULT_CAPACITY;
use crate::element::{MapKey, MapValue};
use crate::scatter_map::ScatterMap;

impl<K: MapKey, V: MapValue, S: BuildHasher> AddAssign<(K, V)> for ScatterMap<K, V, S> {
    fn add_assign(&mut self, (key, value): (K, V)) {
        self.put(key, value);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher, const N: usize> AddAssign<[(K, V); N]>
    for ScatterMap<K, V, S>
{
    fn add_assign(&mut self, pairs: [(K, V); N]) {
        self.put_all(pairs);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher> AddAssign<Vec<(K, V)>> for ScatterMap<K, V, S> {
    fn add_assign(&mut self, pairs: Vec<(K, V)>) {
        self.put_all(pairs);
    }
}

/// Copies every entry of `other`, overwriting existing keys.
impl<K, V, S, S2> AddAssign<&ScatterMap<K, V, S2>> for ScatterMap<K, V, S>
where
    K: MapKey + Clone,
    V: MapValue + Clone,
    S: BuildHasher,
{
    fn add_assign(&mut self, other: &ScatterMap<K, V, S2>) {
        self.put_all(other.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher> SubAssign<K> for ScatterMap<K, V, S> {
    fn sub_assign(&mut self, key: K) {
        self.remove(&key);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher> SubAssign<&[K]> for ScatterMap<K, V, S> {
    fn sub_assign(&mut self, keys: &[K]) {
        self.remove_all(keys);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher, const N: usize> SubAssign<[K; N]>
    for ScatterMap<K, V, S>
{
    fn sub_assign(&mut self, keys: [K; N]) {
        self.remove_all(&keys);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher> SubAssign<Vec<K>> for ScatterMap<K, V, S> {
    fn sub_assign(&mut self, keys: Vec<K>) {
        self.remove_all(&keys);
    }
}

impl<K: MapKey, V: MapValue, S: BuildHasher, S2> SubAssign<&HashSet<K, S2>>
    for ScatterMap<K, V, S>
{
    fn sub_assign(&mut self, keys: &HashSet<K, S2>) {
        self.remove_all(keys);
    }
}

impl<K, V, S> FromIterator<(K, V)> for ScatterMap<K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut map = Self::with_capacity_and_hasher(lower.max(DEFAULT_CAPACITY), S::default());
        map.put_all(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for ScatterMap<K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for ScatterMap<K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher + Default,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
