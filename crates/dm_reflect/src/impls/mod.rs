//! [`Typed`](crate::info::Typed) implementations for built-in types.
//!
//! - Primitives: `bool`, `i32`, `i64`, `f64`, `String`, and the `bson`
//!   types `ObjectId`, `DateTime`, `Uuid`, `Binary`, `Document`, `Bson`.
//! - Containers: `Vec<T>`, `Option<T>`, `HashMap<String, V>`,
//!   `BTreeMap<String, V>`.
//!
//! Use [`impl_opaque!`](crate::impl_opaque) for other foreign types.

mod containers;
mod primitives;

/// Implements `TypePath` and `Typed` for a type without built-in encoding.
///
/// Opaque types can only be encoded after a codec has been registered for
/// them.
///
/// # Examples
///
/// ```
/// use dm_reflect::impl_opaque;
/// use dm_reflect::info::{TypeKind, TypePath, Typed};
///
/// pub struct Money(i64);
/// impl_opaque!(Money);
///
/// assert!(matches!(Money::type_ref().kind(), TypeKind::Opaque));
/// assert!(Money::type_path().ends_with("::Money"));
/// ```
#[macro_export]
macro_rules! impl_opaque {
    ($ty:ident) => {
        impl $crate::info::TypePath for $ty {
            fn type_path() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!($ty))
            }

            fn type_name() -> &'static str {
                ::core::stringify!($ty)
            }
        }

        impl $crate::info::Typed for $ty {
            fn type_ref() -> $crate::info::TypeRef {
                $crate::info::TypeRef::opaque::<Self>()
            }
        }
    };
}
