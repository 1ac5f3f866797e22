//! Read-only views.
//!
//! A [`MapView`] exposes the query half of a [`ScatterMap`] and nothing that
//! mutates it. Since it only borrows the map, the map cannot change while a
//! view is alive.

use std::fmt;
use std::hash::BuildHasher;
use std::ops::Deref;

use rustc_hash::FxBuildHasher;

use crate::element::{MapKey, MapValue, Render};
use crate::scatter_map::ScatterMap;

/// Borrowed, read-only handle on a [`ScatterMap`]. Dereferences to the map,
/// so every query method is available; mutating methods are not.
pub struct MapView<'a, K, V, S = FxBuildHasher> {
    map: &'a ScatterMap<K, V, S>,
}

impl<'a, K, V, S> MapView<'a, K, V, S> {
    pub(crate) fn new(map: &'a ScatterMap<K, V, S>) -> Self {
        Self { map }
    }
}

impl<K, V, S> Clone for MapView<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for MapView<'_, K, V, S> {}

impl<'a, K, V, S> Deref for MapView<'a, K, V, S> {
    type Target = ScatterMap<K, V, S>;

    fn deref(&self) -> &ScatterMap<K, V, S> {
        self.map
    }
}

impl<'a, K, V, S> From<&'a ScatterMap<K, V, S>> for MapView<'a, K, V, S> {
    fn from(map: &'a ScatterMap<K, V, S>) -> Self {
        Self::new(map)
    }
}

impl<K, V, S, S2> PartialEq<MapView<'_, K, V, S2>> for MapView<'_, K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &MapView<'_, K, V, S2>) -> bool {
        *self.map == *other.map
    }
}

impl<K, V, S, S2> PartialEq<ScatterMap<K, V, S2>> for MapView<'_, K, V, S>
where
    K: MapKey,
    V: MapValue,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &ScatterMap<K, V, S2>) -> bool {
        *self.map == *other
    }
}

impl<K: Render, V: Render, S> fmt::Display for MapView<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.map, f)
    }
}

impl<K: Render, V: Render, S> fmt::Debug for MapView<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.map, f)
    }
}

impl<'a, K, V, S> IntoIterator for MapView<'a, K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = crate::iter::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}
