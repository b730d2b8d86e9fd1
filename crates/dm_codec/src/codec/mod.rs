//! Encoders and decoders.
//!
//! A [`Codec`] turns one type into a [`Bson`](bson::Bson) value and back.
//! Codecs are resolved per [`TypeRef`](dm_reflect::info::TypeRef) by the
//! [`CodecRegistry`]: codecs derived from schemas, containers and primitives
//! first, then user codecs for every type left over.
//!
//! [`ValueCodec`] is the central dispatch used by every composite codec. It
//! resolves a codec from the declared type when one is known, and from the
//! wire representation otherwise.

// -----------------------------------------------------------------------------
// Modules

mod container;
mod context;
mod document;
mod enum_codec;
mod primitive;
mod registry;
mod serde;
mod settings;
mod traits;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use container::{ListCodec, MapCodec, OptionCodec};
pub use context::CodecContext;
pub use document::{DocumentCodec, TypedDocumentCodec};
pub use enum_codec::EnumCodec;
pub use primitive::{PrimitiveCodec, UuidCodec};
pub use registry::CodecRegistry;
pub use serde::SerdeCodec;
pub use settings::{CodecSettings, DbRef, DbRefTransformer, IdentityTransformer, ValueTransformer};
pub use traits::Codec;
pub use value::{ValueCodec, structural_type};
