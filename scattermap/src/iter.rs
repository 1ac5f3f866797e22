use std::iter::FusedIterator;
use std::mem::MaybeUninit;
use std::slice;

use crate::raw_map::metadata::is_full;
use crate::raw_map::{RawParts, RawPartsMut, RawTable};

/// Iterator over the entries of a [`ScatterMap`](crate::ScatterMap), in slot
/// order.
pub struct Iter<'a, K, V> {
    parts: RawParts<'a, K, V>,
    current_index: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a RawTable<K, V>) -> Self {
        Self {
            parts: table.raw_parts(),
            current_index: 0,
            remaining: table.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while self.current_index < self.parts.controls.len() {
            let index = self.current_index;
            self.current_index += 1;
            if is_full(self.parts.controls[index]) {
                self.remaining -= 1;
                // SAFETY: full slots hold initialized keys and values
                let entry = unsafe {
                    (
                        self.parts.keys[index].assume_init_ref(),
                        self.parts.values[index].assume_init_ref(),
                    )
                };
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts,
            current_index: self.current_index,
            remaining: self.remaining,
        }
    }
}

/// Iterator over the keys of a map, in slot order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over the values of a map, in slot order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Mutable iterator over values. Keys stay fixed, so slots never move.
pub struct ValuesMut<'a, K, V> {
    controls: slice::Iter<'a, u8>,
    values: slice::IterMut<'a, MaybeUninit<V>>,
    remaining: usize,
    _keys: std::marker::PhantomData<&'a K>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(table: &'a mut RawTable<K, V>) -> Self {
        let remaining = table.len();
        let RawPartsMut { controls, values } = table.raw_parts_mut();
        Self {
            controls: controls.iter(),
            values: values.iter_mut(),
            remaining,
            _keys: std::marker::PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let control = *self.controls.next()?;
            let value = self.values.next()?;
            if is_full(control) {
                self.remaining -= 1;
                // SAFETY: full slots hold initialized values
                return Some(unsafe { value.assume_init_mut() });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
