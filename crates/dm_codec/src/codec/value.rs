use std::sync::Arc;

use bson::oid::ObjectId;
use bson::spec::BinarySubtype;
use bson::uuid::UuidRepresentation;
use bson::{Binary, Bson, DateTime, Document, Uuid};
use dm_reflect::Reflect;
use dm_reflect::info::{PrimitiveKind, TypeKind, TypeRef, Typed};

use super::{Codec, CodecContext, CodecRegistry, CodecSettings};
use crate::CodecError;

/// The type a wire value decodes to when nothing else is known about it.
///
/// 16-byte binaries are read as [`Uuid`] when their subtype agrees with the
/// configured representation: subtype 3 for the legacy layouts, subtype 4
/// for the standard one. Arrays decode to `Vec<Bson>` and documents to
/// [`Document`].
///
/// # Examples
///
/// ```
/// use bson::uuid::UuidRepresentation;
/// use bson::{Binary, Bson, Uuid};
/// use dm_codec::codec::{CodecSettings, structural_type};
///
/// let settings = CodecSettings::default();
/// let binary = Bson::Binary(Binary::from_uuid(Uuid::new()));
///
/// assert!(structural_type(&binary, &settings).is::<Uuid>());
/// assert!(structural_type(&Bson::Int64(1), &settings).is::<i64>());
/// ```
pub fn structural_type(value: &Bson, settings: &CodecSettings) -> TypeRef {
    match value {
        Bson::Boolean(_) => bool::type_ref(),
        Bson::Int32(_) => i32::type_ref(),
        Bson::Int64(_) => i64::type_ref(),
        Bson::Double(_) => f64::type_ref(),
        Bson::String(_) | Bson::Symbol(_) => String::type_ref(),
        Bson::ObjectId(_) => ObjectId::type_ref(),
        Bson::DateTime(_) => DateTime::type_ref(),
        Bson::Binary(binary) if is_uuid(binary, settings.uuid_representation()) => Uuid::type_ref(),
        Bson::Binary(_) => Binary::type_ref(),
        Bson::Array(_) => <Vec<Bson>>::type_ref(),
        Bson::Document(_) => Document::type_ref(),
        _ => Bson::type_ref(),
    }
}

fn is_uuid(binary: &Binary, representation: UuidRepresentation) -> bool {
    if binary.bytes.len() != 16 {
        return false;
    }
    match binary.subtype {
        BinarySubtype::UuidOld => matches!(
            representation,
            UuidRepresentation::JavaLegacy | UuidRepresentation::CSharpLegacy | UuidRepresentation::PythonLegacy
        ),
        BinarySubtype::Uuid => matches!(representation, UuidRepresentation::Standard),
        _ => false,
    }
}

/// The dispatch every composite codec uses for its elements.
pub struct ValueCodec;

impl ValueCodec {
    /// Decodes one value, `None` for a null.
    ///
    /// The declared type selects the codec when one is registered for it.
    /// Otherwise the codec is picked by [`structural_type`]. The result goes
    /// through the configured [`ValueTransformer`](super::ValueTransformer).
    pub fn read_value(
        value: &Bson,
        declared: Option<&TypeRef>,
        ctx: &CodecContext<'_>,
    ) -> Result<Option<Box<dyn Reflect>>, CodecError> {
        let passthrough = declared.is_some_and(|ty| matches!(ty.kind(), TypeKind::Primitive(PrimitiveKind::Bson)));
        if matches!(value, Bson::Null) && !passthrough {
            return Ok(None);
        }

        let codecs = ctx.codecs();
        let codec = match declared.map(|ty| codecs.get(ty)) {
            Some(Ok(codec)) => codec,
            Some(Err(CodecError::NoCodec { ty })) => {
                log::trace!("no codec for `{ty}`, decoding `{}` structurally", ctx.path());
                codecs.get(&structural_type(value, codecs.settings()))?
            }
            Some(Err(err)) => return Err(err),
            None => codecs.get(&structural_type(value, codecs.settings()))?,
        };

        let decoded = codec.decode(value, ctx)?;
        Ok(Some(codecs.settings().transformer().transform(decoded)))
    }

    /// Decodes a value of `ty`, mapping null to `None` for optional types.
    pub fn read_into(value: &Bson, ty: &TypeRef, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match Self::read_value(value, Some(ty), ctx)? {
            Some(value) => Ok(value),
            None => match ty.kind() {
                TypeKind::Option(ops) => Ok(ops.none()),
                _ => Err(CodecError::NullNotAllowed {
                    path: ctx.path(),
                    ty: ty.path(),
                }),
            },
        }
    }

    /// Encodes `value` with the codec of `ty`.
    pub fn write_value(value: &dyn Reflect, ty: &TypeRef, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        ctx.codecs().get(ty)?.encode(value, ctx)
    }

    /// The codec used for values of `ty`.
    #[inline]
    pub fn encode_for(ty: &TypeRef, codecs: &CodecRegistry) -> Result<Arc<dyn Codec>, CodecError> {
        codecs.get(ty)
    }
}
