//! Typed document codecs.
//!
//! Turns the metadata emitted by `dm_reflect` derives into validated
//! schemas, and schemas into reusable BSON encoders and decoders.
//!
//! - [`schema`]: field descriptors, type, model and enum schemas.
//! - [`registry`]: the [`TypeRegistry`](registry::TypeRegistry) cache,
//!   building every schema once.
//! - [`codec`]: the [`Codec`](codec::Codec) trait, the codec provider
//!   chain and the generic value codec.
//! - [`model`]: schema namespaces bound to a storage backend.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use bson::doc;
//! use dm_codec::codec::CodecRegistry;
//! use dm_codec::registry::TypeRegistry;
//! use dm_reflect::derive::{Mapped, MappedEnum};
//!
//! #[derive(MappedEnum, Debug, Clone, Copy, PartialEq, Default)]
//! enum Status {
//!     #[default]
//!     #[docmap(map_as = "A")]
//!     Active,
//!     #[docmap(map_as = "B")]
//!     Banned,
//! }
//!
//! #[derive(Mapped, Debug, PartialEq, Default)]
//! #[docmap(mapped, default)]
//! struct Member {
//!     #[docmap(field)]
//!     email: String,
//!     #[docmap(field)]
//!     status: Status,
//! }
//!
//! let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
//! let member = Member { email: "a@b.com".into(), status: Status::Banned };
//!
//! let document = codecs.to_document(&member).unwrap();
//! assert_eq!(document, doc! { "email": "a@b.com", "status": "B" });
//! assert_eq!(codecs.from_document::<Member>(&document).unwrap(), member);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod codec;
pub mod model;
pub mod registry;
pub mod schema;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Exports

pub use error::{CodecError, LookupError, SchemaError};
