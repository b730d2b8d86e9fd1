//! Schema namespaces bound to a storage backend.
//!
//! The storage backend itself is a collaborator behind the [`Storage`] and
//! [`Collection`] traits. A [`ModelRegistry`] registers named namespaces,
//! builds their models and creates one unique index per unique field.

// -----------------------------------------------------------------------------
// Modules

mod namespace;
mod registry;
mod storage;

// -----------------------------------------------------------------------------
// Exports

pub use namespace::ModelNamespace;
pub use registry::ModelRegistry;
pub use storage::{Collection, IndexModel, Storage, StorageError};
