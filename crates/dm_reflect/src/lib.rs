//! Static type metadata for document mapping.
//!
//! The derive macros in [`derive`] turn struct and enum declarations into
//! [`TypeDescription`](info::TypeDescription) and
//! [`EnumDescription`](info::EnumDescription) values, which `dm_codec` turns
//! into schemas and codecs. Nothing here inspects types at run time beyond
//! `TypeId` comparisons.
//!
//! # Examples
//!
//! ```
//! use dm_reflect::derive::{Mapped, MappedEnum};
//! use dm_reflect::info::{Mapped as _, TypeKind, Typed};
//!
//! #[derive(MappedEnum, Clone, Copy)]
//! enum Status {
//!     #[docmap(map_as = "A")]
//!     Active,
//!     #[docmap(map_as = "B")]
//!     Banned,
//! }
//!
//! #[derive(Mapped, Default)]
//! #[docmap(mapped, default)]
//! struct Account {
//!     #[docmap(field = "login", unique)]
//!     name: String,
//!     #[docmap(field)]
//!     status: Option<Status>,
//!     cache: Vec<u8>,
//! }
//!
//! let desc = Account::describe();
//! assert!(desc.is_mapped());
//! assert_eq!(desc.fields().len(), 2);
//! assert_eq!(desc.fields()[0].name(), "login");
//! assert!(matches!(Status::type_ref().kind(), TypeKind::Enum(_)));
//! ```

// -----------------------------------------------------------------------------
// Extern Self

// Derives expand to `::dm_reflect::...`, which must also resolve inside
// this crate's own tests.
extern crate self as dm_reflect;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod reflection;

pub mod impls;
pub mod info;

#[cfg(feature = "auto_register")]
pub mod auto_register;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use error::AccessError;
pub use reflection::Reflect;

pub use dm_reflect_derive as derive;
