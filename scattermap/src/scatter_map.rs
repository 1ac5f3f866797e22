use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::mem;
use std::ptr;

use rustc_hash::FxBuildHasher;

use crate::capacity::{capacity_for, DEFAULT_CAPACITY};
use crate::element::{MapKey, MapValue, Render, Rendered};
use crate::iter::{Iter, Keys, Values, ValuesMut};
use crate::raw_map::RawTable;
use crate::view::MapView;

/// An open-addressing hash map specialized for its key and value kinds.
///
/// Entries live unboxed in parallel key and value arrays; a byte of metadata
/// per slot drives probing. The capacity is always `0` or `2^k - 1` and the
/// table is never loaded past 7/8. See the [crate docs](crate) for the layout.
///
/// ```
/// use scattermap::{IntObjectMap, LongLongMap, ScatterMapError};
///
/// let mut names = IntObjectMap::<String>::new();
/// names.set(1, "World".to_string());
/// assert_eq!(names.get(&1).map(String::as_str), Some("World"));
/// assert_eq!(names.get(&2), None);
///
/// let mut counts = LongLongMap::new();
/// counts.set(1, 10);
/// assert_eq!(counts.get(&1), Ok(10));
/// assert!(matches!(counts.get(&2), Err(ScatterMapError::KeyNotFound { .. })));
/// ```
pub struct ScatterMap<K, V, S = FxBuildHasher> {
    table: RawTable<K, V>,
    hasher: S,
}

fn make_hash<K: MapKey, S: BuildHasher>(hasher: &S, key: &K) -> u64 {
    let mut state = hasher.build_hasher();
    key.hash_key(&mut state);
    state.finish()
}

impl<K, V> ScatterMap<K, V, FxBuildHasher> {
    /// Creates a map with the smallest non-empty capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map able to hold `capacity` entries without growing.
    /// A capacity of `0` yields the empty table.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }

    /// Creates a map with no slots. All such maps share the same static,
    /// read-only metadata and allocate nothing until the first insertion.
    pub fn empty() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V> Default for ScatterMap<K, V, FxBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ScatterMap<K, V, S> {
    /// Creates a map with the smallest non-empty capacity and the given hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Creates a map able to hold `capacity` entries without growing, using
    /// the given hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: RawTable::with_capacity(capacity_for(capacity)),
            hasher,
        }
    }

    /// Returns the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the map holds at least one entry.
    pub fn is_not_empty(&self) -> bool {
        self.len() != 0
    }

    /// True when the map has no entries.
    pub fn none(&self) -> bool {
        self.is_empty()
    }

    /// Same as [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Iterates over entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table)
    }

    /// Iterates over keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Iterates over values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Iterates over mutable values in slot order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(&mut self.table)
    }

    /// Calls `f` on every entry.
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        self.iter().for_each(|(k, v)| f(k, v));
    }

    /// Calls `f` on every key.
    pub fn for_each_key(&self, f: impl FnMut(&K)) {
        self.keys().for_each(f);
    }

    /// Calls `f` on every value.
    pub fn for_each_value(&self, f: impl FnMut(&V)) {
        self.values().for_each(f);
    }

    /// Number of entries matching `predicate`.
    pub fn count_where(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> usize {
        self.iter().filter(|(k, v)| predicate(k, v)).count()
    }

    /// True if at least one entry matches. False for an empty map.
    pub fn any(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> bool {
        self.iter().any(|(k, v)| predicate(k, v))
    }

    /// True if every entry matches. True for an empty map.
    pub fn all(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> bool {
        self.iter().all(|(k, v)| predicate(k, v))
    }

    /// Removes every entry. The capacity is kept.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Read-only handle on this map.
    pub fn as_view(&self) -> MapView<'_, K, V, S> {
        MapView::new(self)
    }

    /// Address used to recognize elements that point back at this map.
    fn container(&self) -> *const () {
        self as *const Self as *const ()
    }
}

impl<K, V, S> ScatterMap<K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher,
{
    fn find_index(&self, key: &K) -> Option<usize> {
        if self.table.len() == 0 {
            return None;
        }
        let hash = make_hash(&self.hasher, key);
        self.table.find(hash, |k| k.key_eq(key))
    }

    /// Indexed lookup. A missing key is reported the way the value kind
    /// prescribes: `Err(KeyNotFound)` for primitive values, `None` for object
    /// values. Nullable values also report a stored `None` as `None`.
    pub fn get(&self, key: &K) -> V::Lookup<'_> {
        match self.find(key) {
            Some(value) => V::found(value),
            None => V::missing(&Rendered(key)),
        }
    }

    /// Reference to the value stored under `key`, for any value kind.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_index(key).map(|index| self.table.value(index))
    }

    /// Mutable reference to the value stored under `key`.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find_index(key)?;
        Some(self.table.value_mut(index))
    }

    /// Returns true if `key` has an entry, even one holding `None`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_index(key).is_some()
    }

    /// Linear scan comparing values with the value kind's equality.
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|v| v.value_eq(value))
    }

    /// Value for `key`, or `default` when the key is missing. A stored `None`
    /// is returned as is.
    pub fn get_or_default(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.find(key).cloned().unwrap_or(default)
    }

    /// Value for `key`, or the result of `f` when the key is missing or holds
    /// `None`. `f` runs at most once and the map is not modified.
    pub fn get_or_else(&self, key: &K, f: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        match self.find(key) {
            Some(value) if !value.is_absent() => value.clone(),
            _ => f(),
        }
    }

    /// Value for `key`, inserting the result of `f` first when absent. `f`
    /// runs at most once, and whatever it returns is stored, `None` included.
    pub fn get_or_put(&mut self, key: K, f: impl FnOnce() -> V) -> &mut V {
        let hash = make_hash(&self.hasher, &key);
        let index = match self.table.find(hash, |k| k.key_eq(&key)) {
            Some(index) => index,
            None => {
                let value = f();
                let hasher = &self.hasher;
                self.table.insert(hash, key, value, |k| make_hash(hasher, k))
            }
        };
        self.table.value_mut(index)
    }

    /// Inserts or replaces, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = make_hash(&self.hasher, &key);
        if let Some(index) = self.table.find(hash, |k| k.key_eq(&key)) {
            return Some(mem::replace(self.table.value_mut(index), value));
        }
        let hasher = &self.hasher;
        self.table.insert(hash, key, value, |k| make_hash(hasher, k));
        None
    }

    /// Inserts or replaces, discarding the previous value.
    pub fn set(&mut self, key: K, value: V) {
        self.put(key, value);
    }

    /// Puts every pair in iteration order; later duplicates win.
    pub fn put_all(&mut self, pairs: impl IntoIterator<Item = (K, V)>) {
        for (key, value) in pairs {
            self.put(key, value);
        }
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.find_index(key)?;
        let (_, value) = self.table.erase(index);
        Some(value)
    }

    /// Removes `key` only if it currently maps to `expected`.
    pub fn remove_value(&mut self, key: &K, expected: &V) -> bool {
        match self.find_index(key) {
            Some(index) if self.table.value(index).value_eq(expected) => {
                drop(self.table.erase(index));
                true
            }
            _ => false,
        }
    }

    /// Removes every entry for which `predicate` returns true, in a single
    /// pass over the slots.
    pub fn remove_if(&mut self, predicate: impl FnMut(&K, &V) -> bool) {
        self.table.erase_where(predicate);
    }

    /// Removes every key yielded by `keys`. Absent keys are skipped.
    pub fn remove_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>)
    where
        K: 'a,
    {
        for key in keys {
            self.remove(key);
        }
    }

    /// Shrinks the table to the smallest capacity that fits the current
    /// entries. Returns the number of slots released, `0` if the table was
    /// already minimal.
    pub fn trim(&mut self) -> usize {
        let capacity = self.table.capacity();
        let target = capacity_for(self.table.len());
        if target >= capacity {
            return 0;
        }
        let hasher = &self.hasher;
        self.table.resize(target, |k| make_hash(hasher, k));
        log::debug!("trimmed table from {capacity} to {target} slots");
        capacity - target
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for ScatterMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

/// Same size, and every key maps to an equal value in both maps. Hashers and
/// slot order do not matter.
impl<K, V, S, S2> PartialEq<ScatterMap<K, V, S2>> for ScatterMap<K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &ScatterMap<K, V, S2>) -> bool {
        if ptr::eq(self.container(), other.container()) {
            return true;
        }
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.find(k).is_some_and(|o| v.value_eq(o)))
    }
}

/// Renders `{key1=value1, key2=value2}` in slot order.
impl<K: Render, V: Render, S> fmt::Display for ScatterMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let container = self.container();
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            k.render(container, f)?;
            f.write_str("=")?;
            v.render(container, f)?;
        }
        f.write_str("}")
    }
}

impl<K: Render, V: Render, S> fmt::Debug for ScatterMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<'a, K, V, S> IntoIterator for &'a ScatterMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
