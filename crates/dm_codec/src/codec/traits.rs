use bson::{Bson, Document};
use dm_reflect::Reflect;
use dm_reflect::info::Type;

use super::CodecContext;
use crate::CodecError;

/// An encoder and decoder bound to exactly one type.
///
/// Codecs hold no per-call state and may be shared between threads once
/// built.
pub trait Codec: Send + Sync + 'static {
    /// The type this codec handles.
    fn target(&self) -> Type;

    /// Encodes `value`, which must be of the [`target`](Codec::target) type.
    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError>;

    /// Decodes a non-null value into the target type.
    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError>;

    /// Decodes a top-level document.
    fn decode_document(&self, document: &Document, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        self.decode(&Bson::Document(document.clone()), ctx)
    }
}
