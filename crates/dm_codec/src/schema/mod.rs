//! Validated schemas.
//!
//! - [`FieldDescriptor`]: one mapped field.
//! - [`TypeSchema`]: the fields and construction rules of a mapped type.
//! - [`ModelSchema`]: a type schema bound to a collection.
//! - [`EnumSchema`]: the bijection between enum variants and their
//!   external values.
//!
//! Schemas are built through the [`TypeRegistry`](crate::registry::TypeRegistry)
//! and never change afterwards.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod enum_schema;
mod field;
mod type_schema;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use builder::build_type_schema;

pub use enum_schema::EnumSchema;
pub use field::{FieldDescriptor, ID_FIELD};
pub use type_schema::{ConstructorSpec, ModelSchema, TypeSchema};
