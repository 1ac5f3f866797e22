//! Open-addressing hash maps specialized per key/value kind.
//!
//! Every map is a `ScatterMap<K, V, S>` monomorphized for its key and value
//! types. Primitive keys and values (`i32`, `i64`, `f32`, ...) are stored
//! unboxed in parallel slot arrays; object keys and values are stored inline
//! the same way. The table itself is a metadata-driven open-addressing
//! layout:
//!
//! - one control byte per slot (empty, deleted, or full with a 7 bit hash
//!   fragment), scanned eight at a time;
//! - triangular probing over groups of eight slots;
//! - tombstone deletion, reclaimed on the next rehash;
//! - capacities of the form `2^k - 1` loaded to at most 7/8.
//!
//! Key and value kinds plug in through [`MapKey`] and [`MapValue`]. The value
//! kind decides how [`ScatterMap::get`] reports a missing key: primitive
//! values return [`ScatterMapError::KeyNotFound`], object values return
//! `None`.
//!
//! Maps are plain single-owner containers with no internal synchronization.

pub mod aliases;
pub mod capacity;
pub mod element;
pub mod error;
pub mod iter;
mod ops;
mod raw_map;
pub mod scatter_map;
pub mod view;

pub use aliases::*;
pub use element::{MapKey, MapValue, Object, Render};
pub use error::{Result, ScatterMapError};
pub use iter::{Iter, Keys, Values, ValuesMut};
pub use scatter_map::ScatterMap;
pub use view::MapView;
