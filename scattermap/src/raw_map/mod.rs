//! The raw open-addressing table.
//!
//! `RawTable` owns the control bytes and the two slot arrays and keeps them
//! coherent. It knows nothing about hashing: callers pass the hash of the key
//! they look for, an equality predicate, and for operations that may rehash,
//! a function that rehashes stored keys.

use std::mem;

use crate::capacity::{capacity_for, max_load, next_capacity};

use self::metadata::{h1, h2, is_full, Metadata, DELETED, EMPTY};
use self::probe::ProbeSeq;
use self::storage::Slots;

pub(crate) mod metadata;
pub(crate) mod probe;
pub(crate) mod storage;

pub(crate) struct RawTable<K, V> {
    metadata: Metadata,
    keys: Slots<K>,
    values: Slots<V>,
    capacity: usize,
    size: usize,
    // empty slots that may still be filled before a rehash is due
    growth_left: usize,
}

impl<K, V> RawTable<K, V> {
    /// A table with no slots, backed by the shared empty metadata.
    pub(crate) fn empty() -> Self {
        Self {
            metadata: Metadata::shared_empty(),
            keys: Slots::empty(),
            values: Slots::empty(),
            capacity: 0,
            size: 0,
            growth_left: 0,
        }
    }

    /// Allocates a table of exactly `capacity` slots, which must be `0` or a
    /// legal capacity from [`capacity_for`].
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::empty();
        }
        Self {
            metadata: Metadata::new(capacity),
            keys: Slots::new(capacity),
            values: Slots::new(capacity),
            capacity,
            size: 0,
            growth_left: max_load(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_shared_empty(&self) -> bool {
        self.metadata.is_shared()
    }

    #[inline]
    pub(crate) fn is_full(&self, index: usize) -> bool {
        index < self.capacity && is_full(self.metadata.get(index))
    }

    /// Slot holding the key equal to the probe, if any.
    pub(crate) fn find(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Option<usize> {
        let h2 = h2(hash);
        let mut probe = ProbeSeq::new(h1(hash), self.capacity);
        loop {
            let group = self.metadata.group(probe.offset());
            for bit in group.match_h2(h2) {
                let index = probe.slot(bit);
                // SAFETY: match_h2 only reports full slots
                if eq(unsafe { self.keys.get(index) }) {
                    return Some(index);
                }
            }
            if group.match_empty().any() {
                return None;
            }
            probe.advance();
        }
    }

    /// First empty or deleted slot on the probe path of `hash`.
    fn find_insert_slot(&self, hash: u64) -> usize {
        debug_assert!(self.capacity > 0);
        let mut probe = ProbeSeq::new(h1(hash), self.capacity);
        loop {
            let group = self.metadata.group(probe.offset());
            if let Some(bit) = group.match_empty_or_deleted().lowest() {
                return probe.slot(bit);
            }
            probe.advance();
        }
    }

    /// Inserts a key known to be absent and returns its slot.
    ///
    /// Reuses a tombstone on the probe path when there is one; otherwise
    /// consumes an empty slot, rehashing first when the load limit has been
    /// reached.
    pub(crate) fn insert(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        hasher: impl Fn(&K) -> u64,
    ) -> usize {
        if self.capacity == 0 {
            self.resize(capacity_for(self.size + 1), &hasher);
        }
        let mut index = self.find_insert_slot(hash);
        if self.metadata.get(index) == EMPTY && self.growth_left == 0 {
            self.reserve_for_insert(&hasher);
            index = self.find_insert_slot(hash);
        }
        if self.metadata.get(index) == EMPTY {
            self.growth_left -= 1;
        } else {
            log::trace!("reusing deleted slot {index}");
        }
        self.metadata.set(index, self.capacity, h2(hash));
        // SAFETY: the slot was empty or deleted, so it holds no live entry
        unsafe {
            self.keys.write(index, key);
            self.values.write(index, value);
        }
        self.size += 1;
        index
    }

    /// Makes room for one more entry once every empty slot the load factor
    /// allows has been used. When tombstones make up a large share of the
    /// used slots, the table is rehashed in place at the same capacity.
    fn reserve_for_insert(&mut self, hasher: &impl Fn(&K) -> u64) {
        let capacity = if self.size * 32 <= self.capacity * 25 {
            self.capacity
        } else {
            // at least double, so a table that keeps rehashing just above
            // the in-place threshold still grows geometrically
            capacity_for(self.size + 1).max(next_capacity(self.capacity))
        };
        self.resize(capacity, hasher);
    }

    /// Moves every entry into a fresh allocation of `capacity` slots.
    /// Tombstones are not carried over.
    pub(crate) fn resize(&mut self, capacity: usize, hasher: impl Fn(&K) -> u64) {
        debug_assert!(max_load(capacity) >= self.size);
        log::debug!(
            "rehashing {} entries from capacity {} to {}",
            self.size,
            self.capacity,
            capacity
        );
        let mut old = mem::replace(self, Self::with_capacity(capacity));
        for index in 0..old.capacity {
            if !is_full(old.metadata.get(index)) {
                continue;
            }
            // SAFETY: the slot is full
            let hash = hasher(unsafe { old.keys.get(index) });
            // SAFETY: the slot is full and is marked empty right after, so
            // `old` never touches it again
            let (key, value) = unsafe { (old.keys.take(index), old.values.take(index)) };
            old.metadata.set(index, old.capacity, EMPTY);
            old.size -= 1;

            let slot = self.find_insert_slot(hash);
            self.metadata.set(slot, self.capacity, h2(hash));
            // SAFETY: a fresh table only has empty slots
            unsafe {
                self.keys.write(slot, key);
                self.values.write(slot, value);
            }
            self.size += 1;
            self.growth_left -= 1;
        }
    }

    /// Removes the entry in slot `index`, leaving a tombstone.
    pub(crate) fn erase(&mut self, index: usize) -> (K, V) {
        assert!(self.is_full(index), "slot {index} is not occupied");
        self.metadata.set(index, self.capacity, DELETED);
        self.size -= 1;
        // SAFETY: the slot was full and is now marked deleted
        unsafe { (self.keys.take(index), self.values.take(index)) }
    }

    /// Removes every entry for which `f` returns true, in slot order, and
    /// returns how many were removed.
    pub(crate) fn erase_where(&mut self, mut f: impl FnMut(&K, &V) -> bool) -> usize {
        let mut removed = 0;
        for index in 0..self.capacity {
            if !is_full(self.metadata.get(index)) {
                continue;
            }
            // SAFETY: the slot is full
            let hit = unsafe { f(self.keys.get(index), self.values.get(index)) };
            if hit {
                drop(self.erase(index));
                removed += 1;
            }
        }
        removed
    }

    /// Drops every entry and marks all slots empty, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        if self.is_shared_empty() {
            return;
        }
        for index in 0..self.capacity {
            if is_full(self.metadata.get(index)) {
                self.metadata.set(index, self.capacity, EMPTY);
                // SAFETY: the slot was full and is now marked empty
                unsafe {
                    self.keys.drop_in_place(index);
                    self.values.drop_in_place(index);
                }
            }
        }
        self.metadata.reset(self.capacity);
        self.size = 0;
        self.growth_left = max_load(self.capacity);
    }

    pub(crate) fn value(&self, index: usize) -> &V {
        assert!(self.is_full(index), "slot {index} is not occupied");
        // SAFETY: the slot is full
        unsafe { self.values.get(index) }
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        assert!(self.is_full(index), "slot {index} is not occupied");
        // SAFETY: the slot is full
        unsafe { self.values.get_mut(index) }
    }

    /// Control bytes and slot arrays, for iteration. A key or value slot is
    /// initialized exactly when its control byte is full.
    pub(crate) fn raw_parts(&self) -> RawParts<'_, K, V> {
        RawParts {
            controls: self.metadata.slots(self.capacity),
            keys: self.keys.as_slice(),
            values: self.values.as_slice(),
        }
    }

    pub(crate) fn raw_parts_mut(&mut self) -> RawPartsMut<'_, V> {
        RawPartsMut {
            controls: self.metadata.slots(self.capacity),
            values: self.values.as_mut_slice(),
        }
    }
}

pub(crate) struct RawParts<'a, K, V> {
    pub(crate) controls: &'a [u8],
    pub(crate) keys: &'a [mem::MaybeUninit<K>],
    pub(crate) values: &'a [mem::MaybeUninit<V>],
}

impl<K, V> Clone for RawParts<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RawParts<'_, K, V> {}

pub(crate) struct RawPartsMut<'a, V> {
    pub(crate) controls: &'a [u8],
    pub(crate) values: &'a mut [mem::MaybeUninit<V>],
}

impl<K, V> Drop for RawTable<K, V> {
    fn drop(&mut self) {
        if !mem::needs_drop::<K>() && !mem::needs_drop::<V>() {
            return;
        }
        for index in 0..self.capacity {
            if is_full(self.metadata.get(index)) {
                // SAFETY: the slot is full and the table is going away
                unsafe {
                    self.keys.drop_in_place(index);
                    self.values.drop_in_place(index);
                }
            }
        }
    }
}

impl<K: Clone, V: Clone> Clone for RawTable<K, V> {
    /// Copies entries into the same slots, tombstones included, so probe
    /// paths stay valid in the copy.
    fn clone(&self) -> Self {
        let mut table = Self::with_capacity(self.capacity);
        for index in 0..self.capacity {
            let control = self.metadata.get(index);
            if !is_full(control) {
                continue;
            }
            // SAFETY: the slot is full in `self` and still empty in `table`
            unsafe {
                let key = self.keys.get(index).clone();
                let value = self.values.get(index).clone();
                table.keys.write(index, key);
                table.values.write(index, value);
            }
            table.metadata.set(index, table.capacity, control);
            table.size += 1;
        }
        for index in 0..self.capacity {
            if self.metadata.get(index) == DELETED {
                table.metadata.set(index, table.capacity, DELETED);
            }
        }
        table.growth_left = self.growth_left;
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    // every key lands in the same probe sequence and the same h2
    fn colliding(_: &u32) -> u64 {
        0x5a5a_5a5a_5a5a_5a5a
    }

    fn identity(k: &u32) -> u64 {
        u64::from(*k).wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    fn put(table: &mut RawTable<u32, u32>, hasher: fn(&u32) -> u64, k: u32, v: u32) {
        let hash = hasher(&k);
        match table.find(hash, |x| *x == k) {
            Some(index) => *table.value_mut(index) = v,
            None => {
                table.insert(hash, k, v, hasher);
            }
        }
    }

    fn get(table: &RawTable<u32, u32>, hasher: fn(&u32) -> u64, k: u32) -> Option<u32> {
        table.find(hasher(&k), |x| *x == k).map(|i| *table.value(i))
    }

    fn remove(table: &mut RawTable<u32, u32>, hasher: fn(&u32) -> u64, k: u32) -> Option<u32> {
        let index = table.find(hasher(&k), |x| *x == k)?;
        Some(table.erase(index).1)
    }

    #[test]
    fn empty_table_finds_nothing() {
        let table: RawTable<u32, u32> = RawTable::empty();
        assert!(table.is_shared_empty());
        assert_eq!(table.capacity(), 0);
        assert_eq!(get(&table, identity, 1), None);
    }

    #[test]
    fn insert_into_empty_allocates() {
        let mut table = RawTable::empty();
        put(&mut table, identity, 1, 10);
        assert!(!table.is_shared_empty());
        assert_eq!(table.capacity(), 7);
        assert_eq!(get(&table, identity, 1), Some(10));
    }

    #[test]
    fn colliding_keys_probe_past_each_other() {
        let mut table = RawTable::with_capacity(15);
        for k in 0..10 {
            put(&mut table, colliding, k, k * 2);
        }
        assert_eq!(table.len(), 10);
        for k in 0..10 {
            assert_eq!(get(&table, colliding, k), Some(k * 2));
        }
        assert_eq!(get(&table, colliding, 99), None);
    }

    #[test]
    fn tombstones_keep_probe_chains_intact() {
        let mut table = RawTable::with_capacity(15);
        for k in 0..10 {
            put(&mut table, colliding, k, k);
        }
        // knock holes into the middle of the chain
        for k in [0, 3, 5] {
            assert_eq!(remove(&mut table, colliding, k), Some(k));
        }
        for k in [1, 2, 4, 6, 7, 8, 9] {
            assert_eq!(get(&table, colliding, k), Some(k));
        }
        assert_eq!(get(&table, colliding, 3), None);
        assert_eq!(remove(&mut table, colliding, 3), None);
    }

    #[test]
    fn insert_reuses_tombstones_without_growing() {
        let mut table = RawTable::with_capacity(7);
        for k in 1..=6 {
            put(&mut table, identity, k, k);
        }
        assert_eq!(table.growth_left, 0);
        for k in 1..=6 {
            remove(&mut table, identity, k);
        }
        assert_eq!(table.len(), 0);
        put(&mut table, identity, 7, 7);
        assert_eq!(table.len(), 1);
        assert_eq!(table.capacity(), 7);
        assert_eq!(get(&table, identity, 7), Some(7));
    }

    #[test]
    fn growth_rehashes_every_entry() {
        let mut table = RawTable::empty();
        for k in 0..1000 {
            put(&mut table, identity, k, k + 1);
        }
        assert_eq!(table.len(), 1000);
        assert_eq!(table.capacity(), capacity_for(1000));
        for k in 0..1000 {
            assert_eq!(get(&table, identity, k), Some(k + 1));
        }
    }

    #[test]
    fn churn_reclaims_tombstones_in_place() {
        let mut table = RawTable::with_capacity(31);
        for round in 0..200u32 {
            put(&mut table, identity, round, round);
            if round >= 4 {
                assert_eq!(remove(&mut table, identity, round - 4), Some(round - 4));
            }
        }
        assert_eq!(table.len(), 4);
        assert_eq!(table.capacity(), 31);
        for k in 196..200 {
            assert_eq!(get(&table, identity, k), Some(k));
        }
    }

    #[test]
    fn crowded_table_at_least_doubles() {
        let mut table = RawTable::with_capacity(31);
        for k in 0..27 {
            put(&mut table, identity, k, k);
        }
        assert_eq!(table.growth_left, 0);
        remove(&mut table, identity, 0);
        remove(&mut table, identity, 1);
        // 25 live entries would still fit in 31 slots
        assert_eq!(capacity_for(table.len() + 1), 31);
        table.reserve_for_insert(&identity);
        assert_eq!(table.capacity(), 63);
        assert_eq!(table.len(), 25);
        for k in 2..27 {
            assert_eq!(get(&table, identity, k), Some(k));
        }
    }

    #[test]
    fn erase_where_removes_matching_entries() {
        let mut table = RawTable::with_capacity(15);
        for k in 0..10 {
            put(&mut table, identity, k, k * 10);
        }
        let removed = table.erase_where(|k, _| k % 2 == 0);
        assert_eq!(removed, 5);
        assert_eq!(table.len(), 5);
        for k in 0..10 {
            let expected = if k % 2 == 0 { None } else { Some(k * 10) };
            assert_eq!(get(&table, identity, k), expected);
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = RawTable::with_capacity(15);
        for k in 0..10 {
            put(&mut table, identity, k, k);
        }
        remove(&mut table, identity, 3);
        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 15);
        assert_eq!(table.growth_left, max_load(15));
        assert_eq!(get(&table, identity, 1), None);
    }

    #[test]
    fn clone_preserves_tombstones() {
        let mut table = RawTable::with_capacity(15);
        for k in 0..10 {
            put(&mut table, colliding, k, k);
        }
        remove(&mut table, colliding, 0);
        remove(&mut table, colliding, 1);
        let copy = table.clone();
        assert_eq!(copy.len(), 8);
        assert_eq!(copy.capacity(), 15);
        for k in 2..10 {
            assert_eq!(get(&copy, colliding, k), Some(k));
        }
    }

    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn every_value_is_dropped_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut table: RawTable<u32, Counted> = RawTable::empty();
            for k in 0..50u32 {
                let hash = identity(&k);
                table.insert(hash, k, Counted(drops.clone()), identity);
            }
            for k in 0..10u32 {
                let index = table.find(identity(&k), |x| *x == k).unwrap();
                drop(table.erase(index));
            }
            assert_eq!(drops.get(), 10);
            table.erase_where(|k, _| *k < 20);
            assert_eq!(drops.get(), 20);
            table.resize(capacity_for(table.len()), identity);
            assert_eq!(drops.get(), 20);
            table.clear();
            assert_eq!(drops.get(), 50);
            table.insert(identity(&1), 1, Counted(drops.clone()), identity);
        }
        assert_eq!(drops.get(), 51);
    }
}
