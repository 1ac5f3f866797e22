//! Key and value kinds.
//!
//! A map is specialized by its key kind and its value kind. Primitive kinds
//! (`i32`, `i64`, `f32`, and friends) hash and compare by bit pattern and are
//! stored unboxed. Object kinds are any type that opts in through [`Object`].
//! `Option<T>` over an object kind is the nullable kind: `None` is a real,
//! storable value that renders as `null`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use paste::paste;

use crate::error::{Result, ScatterMapError};

/// Text printed in place of an element that refers back to the map being
/// rendered.
pub const SELF_REFERENCE: &str = "(this)";

/// Text printed for an absent nullable element.
pub const NULL: &str = "null";

/// Rendering of keys and values inside `{k=v, ...}`.
pub trait Render {
    /// Writes `self`. `container` is the address of the map being rendered,
    /// so elements that point back at it can print [`SELF_REFERENCE`]
    /// instead of recursing.
    fn render(&self, container: *const (), f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// A type that can be used as a map key.
pub trait MapKey: Render {
    /// Feeds the key into `state`. Keys equal under `key_eq` hash alike.
    fn hash_key<H: Hasher>(&self, state: &mut H);

    /// Key identity used for lookups.
    fn key_eq(&self, other: &Self) -> bool;
}

/// A type that can be used as a map value.
pub trait MapValue: Render {
    /// What [`ScatterMap::get`](crate::ScatterMap::get) returns.
    type Lookup<'a>
    where
        Self: 'a;

    /// Lookup result for a stored value.
    fn found(value: &Self) -> Self::Lookup<'_>;

    /// Lookup result for a missing key.
    fn missing<'a>(key: &dyn fmt::Display) -> Self::Lookup<'a>
    where
        Self: 'a;

    /// Value equality used by `contains_value`, `remove_value` and map
    /// equality.
    fn value_eq(&self, other: &Self) -> bool;

    /// Whether a stored value stands for "no value", so that fallbacks treat
    /// it like a missing key.
    fn is_absent(&self) -> bool {
        false
    }
}

/// Marker for object kinds. Keys also need `Hash + Eq`, values `PartialEq`.
pub trait Object: fmt::Display {
    /// Whether `self` is, or points to, the map at `container`.
    fn refers_to(&self, _container: *const ()) -> bool {
        false
    }
}

macro_rules! primitive_kinds {
    ($($ty:ident => $bits:ident),* $(,)?) => {
        paste! {
            $(
                impl Render for $ty {
                    fn render(&self, _: *const (), f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        fmt::Debug::fmt(self, f)
                    }
                }

                impl MapKey for $ty {
                    #[inline]
                    fn hash_key<H: Hasher>(&self, state: &mut H) {
                        state.[<write_ $bits>](bytemuck::cast::<$ty, $bits>(*self));
                    }

                    #[inline]
                    fn key_eq(&self, other: &Self) -> bool {
                        bytemuck::cast::<$ty, $bits>(*self) == bytemuck::cast::<$ty, $bits>(*other)
                    }
                }

                impl MapValue for $ty {
                    type Lookup<'a>
                        = Result<$ty>
                    where
                        Self: 'a;

                    #[inline]
                    fn found(value: &Self) -> Self::Lookup<'_> {
                        Ok(*value)
                    }

                    fn missing<'a>(key: &dyn fmt::Display) -> Self::Lookup<'a>
                    where
                        Self: 'a,
                    {
                        Err(ScatterMapError::KeyNotFound { key: key.to_string() })
                    }

                    #[inline]
                    fn value_eq(&self, other: &Self) -> bool {
                        self == other
                    }
                }
            )*
        }
    };
}

primitive_kinds!(
    i32 => u32,
    i64 => u64,
    u32 => u32,
    u64 => u64,
    f32 => u32,
    f64 => u64,
);

impl<T: Object + ?Sized> Render for T {
    fn render(&self, container: *const (), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.refers_to(container) {
            f.write_str(SELF_REFERENCE)
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

impl<T: Object + Hash + Eq> MapKey for T {
    #[inline]
    fn hash_key<H: Hasher>(&self, state: &mut H) {
        self.hash(state);
    }

    #[inline]
    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: Object + PartialEq> MapValue for T {
    type Lookup<'a>
        = Option<&'a T>
    where
        Self: 'a;

    #[inline]
    fn found(value: &Self) -> Self::Lookup<'_> {
        Some(value)
    }

    fn missing<'a>(_: &dyn fmt::Display) -> Self::Lookup<'a>
    where
        Self: 'a,
    {
        None
    }

    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: Object> Render for Option<T> {
    fn render(&self, container: *const (), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(inner) => inner.render(container, f),
            None => f.write_str(NULL),
        }
    }
}

impl<T: Object + Hash + Eq> MapKey for Option<T> {
    #[inline]
    fn hash_key<H: Hasher>(&self, state: &mut H) {
        self.hash(state);
    }

    #[inline]
    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// Lookups flatten "stored `None`" and "missing" into `None`.
impl<T: Object + PartialEq> MapValue for Option<T> {
    type Lookup<'a>
        = Option<&'a T>
    where
        Self: 'a;

    #[inline]
    fn found(value: &Self) -> Self::Lookup<'_> {
        value.as_ref()
    }

    fn missing<'a>(_: &dyn fmt::Display) -> Self::Lookup<'a>
    where
        Self: 'a,
    {
        None
    }

    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl Object for String {}
impl Object for str {}
impl Object for bool {}
impl Object for char {}

impl<T: Object + ?Sized> Object for &T {
    fn refers_to(&self, container: *const ()) -> bool {
        (**self).refers_to(container)
    }
}

impl<T: Object + ?Sized> Object for Box<T> {
    fn refers_to(&self, container: *const ()) -> bool {
        (**self).refers_to(container)
    }
}

impl<T: Object + ?Sized> Object for Rc<T> {
    fn refers_to(&self, container: *const ()) -> bool {
        (**self).refers_to(container)
    }
}

impl<T: Object + ?Sized> Object for Arc<T> {
    fn refers_to(&self, container: *const ()) -> bool {
        (**self).refers_to(container)
    }
}

/// Renders an element outside of any map, e.g. for error messages.
pub(crate) struct Rendered<'a, T: ?Sized>(pub(crate) &'a T);

impl<T: Render + ?Sized> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(std::ptr::null(), f)
    }
}
