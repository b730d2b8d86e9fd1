//! The process-scoped schema cache.
//!
//! Every mapped type, model and enum is built at most once per
//! [`TypeRegistry`]. Building a type also builds the types its fields refer
//! to, so registering the root of an object graph is enough.

// -----------------------------------------------------------------------------
// Modules

mod session;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use session::BuildSession;

pub use type_registry::{EntryKind, RegistryEntry, TypeRegistry};
