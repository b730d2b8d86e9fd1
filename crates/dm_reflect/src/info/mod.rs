//! Compile-time type information.
//!
//! ## Menu
//!
//! - [`TypePath`]: static type path and short name.
//! - [`Type`]: a `TypeId` together with its [`TypePath`] functions.
//! - [`TypeRef`]: a type as seen from a field or parameter, either
//!   `Simple` or `Parameterized` with its type arguments, plus a [`TypeKind`].
//! - [`TypeKind`]: how a type is encoded (primitive, mapped struct, enum,
//!   list, map, option or opaque).
//! - [`ListOps`], [`MapOps`], [`OptionOps`]: erased container operations.
//! - [`Typed`]: produces the [`TypeRef`] of `Self`.
//! - [`TypeDescription`], [`FieldDescription`], [`ConstructorDescription`]:
//!   raw metadata emitted by `#[derive(Mapped)]` and `#[constructors]`.
//! - [`EnumDescription`]: raw metadata emitted by `#[derive(MappedEnum)]`.
//! - [`Mapped`], [`MappedEnum`], [`MappedConstructors`]: the traits the
//!   derives implement.

// -----------------------------------------------------------------------------
// Modules

mod description;
mod enum_description;
mod mapped;
mod ops;
mod type_path;
mod type_ref;

// -----------------------------------------------------------------------------
// Exports

pub use description::{
    ConstructorDescription, FieldAccessor, FieldDescription, Invoker, MappingMarker,
    ParamDescription, TypeDescription,
};
pub use enum_description::{EnumDescription, VariantDescription};
pub use mapped::{Mapped, MappedConstructors, MappedEnum};
pub use ops::{ListOps, MapOps, OptionOps};
pub use type_path::{Type, TypePath};
pub use type_ref::{PrimitiveKind, TypeKind, TypeRef, Typed};
