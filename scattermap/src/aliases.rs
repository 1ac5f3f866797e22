//! Named specializations.
//!
//! One alias per pairing of `Int` (`i32`), `Long` (`i64`), `Float` (`f32`)
//! and `Object` keys and values, all using the default hasher. `Object`
//! positions take any object kind, including nullable ones:
//!
//! ```
//! use scattermap::{IntObjectMap, ObjectFloatMap};
//!
//! let mut names: IntObjectMap<Option<String>> = IntObjectMap::new();
//! names.set(1, None);
//! assert_eq!(names.to_string(), "{1=null}");
//!
//! let mut weights = ObjectFloatMap::<String>::new();
//! weights.set("a".to_string(), 0.5);
//! assert_eq!(weights.get(&"a".to_string()), Ok(0.5));
//! ```

use paste::paste;

use crate::scatter_map::ScatterMap;

macro_rules! specializations {
    ($($name:ident => $ty:ty),* $(,)?) => {
        specializations!(@keys [$($name => $ty),*] $($name => $ty),*);
    };
    (@keys $values:tt $($key:ident => $key_ty:ty),*) => {
        $( specializations!(@row $key => $key_ty, $values); )*
    };
    (@row $key:ident => $key_ty:ty, [$($value:ident => $value_ty:ty),*]) => {
        paste! {
            $(
                pub type [<$key $value Map>] = ScatterMap<$key_ty, $value_ty>;
            )*
            pub type [<$key ObjectMap>]<V> = ScatterMap<$key_ty, V>;
            pub type [<Object $key Map>]<K> = ScatterMap<K, $key_ty>;
        }
    };
}

specializations!(
    Int => i32,
    Long => i64,
    Float => f32,
);

pub type ObjectObjectMap<K, V> = ScatterMap<K, V>;
