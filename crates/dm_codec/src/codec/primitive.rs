use bson::oid::ObjectId;
use bson::uuid::UuidRepresentation;
use bson::{Binary, Bson, DateTime, Document, Uuid};
use dm_reflect::Reflect;
use dm_reflect::info::{PrimitiveKind, Type, TypePath};

use super::{Codec, CodecContext, CodecSettings};
use crate::CodecError;

// -----------------------------------------------------------------------------
// PrimitiveCodec

/// Codec of the built-in scalar types.
///
/// Numbers decode across BSON numeric types as long as the value is kept
/// exactly, e.g. an `i32` field accepts `Int64(7)` and `Double(7.0)` but not
/// `Double(7.5)`. Uuids follow the [`CodecSettings`] of the registry in
/// use, like [`UuidCodec`].
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveCodec {
    ty: Type,
    kind: PrimitiveKind,
}

impl PrimitiveCodec {
    #[inline]
    pub fn new(ty: Type, kind: PrimitiveKind) -> Self {
        Self { ty, kind }
    }

    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}

fn boxed<T: Reflect>(value: T) -> Result<Box<dyn Reflect>, CodecError> {
    Ok(Box::new(value))
}

fn out_of_range<T: TypePath>(ctx: &CodecContext<'_>, value: impl ToString) -> CodecError {
    CodecError::OutOfRange {
        path: ctx.path(),
        ty: T::type_path(),
        value: value.to_string(),
    }
}

fn integral(value: f64) -> Option<i64> {
    // Both bounds are exactly representable, `i64::MAX as f64` is not.
    const MIN: f64 = -9_223_372_036_854_775_808.0;
    const MAX: f64 = 9_223_372_036_854_775_808.0;
    (value.fract() == 0.0 && (MIN..MAX).contains(&value)).then_some(value as i64)
}

fn decode_i64(value: &Bson, ctx: &CodecContext<'_>) -> Result<i64, CodecError> {
    match *value {
        Bson::Int32(v) => Ok(i64::from(v)),
        Bson::Int64(v) => Ok(v),
        Bson::Double(v) => integral(v).ok_or_else(|| out_of_range::<i64>(ctx, v)),
        _ => Err(ctx.unexpected("an integer", value)),
    }
}

fn decode_i32(value: &Bson, ctx: &CodecContext<'_>) -> Result<i32, CodecError> {
    let wide = match *value {
        Bson::Int32(v) => return Ok(v),
        Bson::Double(v) => integral(v).ok_or_else(|| out_of_range::<i32>(ctx, v))?,
        _ => decode_i64(value, ctx)?,
    };
    i32::try_from(wide).map_err(|_| out_of_range::<i32>(ctx, wide))
}

fn decode_f64(value: &Bson, ctx: &CodecContext<'_>) -> Result<f64, CodecError> {
    const EXACT: i64 = 1 << f64::MANTISSA_DIGITS;
    match *value {
        Bson::Double(v) => Ok(v),
        Bson::Int32(v) => Ok(f64::from(v)),
        Bson::Int64(v) if (-EXACT..=EXACT).contains(&v) => Ok(v as f64),
        Bson::Int64(v) => Err(out_of_range::<f64>(ctx, v)),
        _ => Err(ctx.unexpected("a number", value)),
    }
}

impl Codec for PrimitiveCodec {
    #[inline]
    fn target(&self) -> Type {
        self.ty
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        Ok(match self.kind {
            PrimitiveKind::Bool => Bson::Boolean(*ctx.downcast::<bool>(value)?),
            PrimitiveKind::Int32 => Bson::Int32(*ctx.downcast::<i32>(value)?),
            PrimitiveKind::Int64 => Bson::Int64(*ctx.downcast::<i64>(value)?),
            PrimitiveKind::Double => Bson::Double(*ctx.downcast::<f64>(value)?),
            PrimitiveKind::String => Bson::String(ctx.downcast::<String>(value)?.clone()),
            PrimitiveKind::ObjectId => Bson::ObjectId(*ctx.downcast::<ObjectId>(value)?),
            PrimitiveKind::DateTime => Bson::DateTime(*ctx.downcast::<DateTime>(value)?),
            PrimitiveKind::Uuid => return UuidCodec::from_settings(ctx.codecs().settings()).encode(value, ctx),
            PrimitiveKind::Binary => Bson::Binary(ctx.downcast::<Binary>(value)?.clone()),
            PrimitiveKind::Document => Bson::Document(ctx.downcast::<Document>(value)?.clone()),
            PrimitiveKind::Bson => ctx.downcast::<Bson>(value)?.clone(),
        })
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match (self.kind, value) {
            (PrimitiveKind::Bool, Bson::Boolean(v)) => boxed(*v),
            (PrimitiveKind::Int32, _) => boxed(decode_i32(value, ctx)?),
            (PrimitiveKind::Int64, _) => boxed(decode_i64(value, ctx)?),
            (PrimitiveKind::Double, _) => boxed(decode_f64(value, ctx)?),
            (PrimitiveKind::String, Bson::String(v) | Bson::Symbol(v)) => boxed(v.clone()),
            (PrimitiveKind::ObjectId, Bson::ObjectId(v)) => boxed(*v),
            (PrimitiveKind::DateTime, Bson::DateTime(v)) => boxed(*v),
            (PrimitiveKind::Uuid, _) => UuidCodec::from_settings(ctx.codecs().settings()).decode(value, ctx),
            (PrimitiveKind::Binary, Bson::Binary(v)) => boxed(v.clone()),
            (PrimitiveKind::Document, Bson::Document(v)) => boxed(v.clone()),
            (PrimitiveKind::Bson, _) => boxed(value.clone()),
            (kind, _) => Err(ctx.unexpected(expected_label(kind), value)),
        }
    }
}

fn expected_label(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "a boolean",
        PrimitiveKind::Int32 | PrimitiveKind::Int64 => "an integer",
        PrimitiveKind::Double => "a number",
        PrimitiveKind::String => "a string",
        PrimitiveKind::ObjectId => "an object id",
        PrimitiveKind::DateTime => "a date time",
        PrimitiveKind::Uuid => "a uuid",
        PrimitiveKind::Binary => "binary data",
        PrimitiveKind::Document => "a document",
        PrimitiveKind::Bson => "a value",
    }
}

// -----------------------------------------------------------------------------
// UuidCodec

/// Codec of [`Uuid`] values.
///
/// Writes the canonical string form when `as_string` is set, binary in the
/// configured representation otherwise. Decoding accepts both forms.
#[derive(Debug, Clone, Copy)]
pub struct UuidCodec {
    representation: UuidRepresentation,
    as_string: bool,
}

impl UuidCodec {
    #[inline]
    pub fn new(representation: UuidRepresentation, as_string: bool) -> Self {
        Self {
            representation,
            as_string,
        }
    }

    #[inline]
    pub fn from_settings(settings: &CodecSettings) -> Self {
        Self::new(settings.uuid_representation(), settings.uuid_as_string())
    }
}

impl Codec for UuidCodec {
    #[inline]
    fn target(&self) -> Type {
        Type::of::<Uuid>()
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        let uuid = *ctx.downcast::<Uuid>(value)?;
        Ok(if self.as_string {
            Bson::String(uuid.to_string())
        } else {
            Bson::Binary(Binary::from_uuid_with_representation(uuid, self.representation))
        })
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        let invalid = |err: bson::uuid::Error| CodecError::InvalidUuid {
            path: ctx.path(),
            message: err.to_string(),
        };
        let uuid = match value {
            Bson::String(text) => Uuid::parse_str(text).map_err(invalid)?,
            Bson::Binary(binary) => binary
                .to_uuid_with_representation(self.representation)
                .map_err(invalid)?,
            _ => return Err(ctx.unexpected("a uuid string or binary", value)),
        };
        boxed(uuid)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::uuid::UuidRepresentation;
    use bson::{Bson, Uuid};
    use dm_reflect::info::{PrimitiveKind, Type};

    use super::{PrimitiveCodec, UuidCodec};
    use crate::CodecError;
    use crate::codec::{Codec, CodecContext, CodecRegistry, CodecSettings};
    use crate::registry::TypeRegistry;

    fn codecs() -> CodecRegistry {
        CodecRegistry::new(Arc::new(TypeRegistry::new()))
    }

    #[test]
    fn lossless_numbers() {
        let codecs = codecs();
        let ctx = CodecContext::new(&codecs);
        let int32 = PrimitiveCodec::new(Type::of::<i32>(), PrimitiveKind::Int32);

        let value = int32.decode(&Bson::Int64(7), &ctx).unwrap();
        assert_eq!(value.take::<i32>().ok(), Some(7));
        let value = int32.decode(&Bson::Double(-3.0), &ctx).unwrap();
        assert_eq!(value.take::<i32>().ok(), Some(-3));

        assert!(matches!(
            int32.decode(&Bson::Int64(i64::MAX), &ctx),
            Err(CodecError::OutOfRange { ty: "i32", .. })
        ));
        assert!(matches!(
            int32.decode(&Bson::Double(7.5), &ctx),
            Err(CodecError::OutOfRange { .. })
        ));

        let double = PrimitiveCodec::new(Type::of::<f64>(), PrimitiveKind::Double);
        assert_eq!(double.decode(&Bson::Int32(2), &ctx).unwrap().take::<f64>().ok(), Some(2.0));
        assert!(double.decode(&Bson::Int64(i64::MAX), &ctx).is_err());
    }

    #[test]
    fn mismatched_elements() {
        let codecs = codecs();
        let ctx = CodecContext::new(&codecs);
        let string = PrimitiveCodec::new(Type::of::<String>(), PrimitiveKind::String);
        assert!(matches!(
            string.decode(&Bson::Int32(1), &ctx),
            Err(CodecError::UnexpectedElement { expected: "a string", .. })
        ));
        assert_eq!(
            string.decode(&Bson::Symbol("s".into()), &ctx).unwrap().take::<String>().ok(),
            Some("s".to_owned())
        );
        assert!(matches!(
            string.encode(&1_i32, &ctx),
            Err(CodecError::Access { .. })
        ));
    }

    #[test]
    fn primitive_uuid_follows_settings() {
        let uuid = Uuid::new();
        let primitive = PrimitiveCodec::new(Type::of::<Uuid>(), PrimitiveKind::Uuid);

        let codecs = codecs();
        let ctx = CodecContext::new(&codecs);
        assert_eq!(primitive.encode(&uuid, &ctx).unwrap(), Bson::String(uuid.to_string()));

        let settings = CodecSettings::default()
            .with_uuid_as_string(false)
            .with_uuid_representation(UuidRepresentation::JavaLegacy);
        let codecs = CodecRegistry::with_settings(Arc::new(TypeRegistry::new()), settings);
        let ctx = CodecContext::new(&codecs);
        let encoded = primitive.encode(&uuid, &ctx).unwrap();
        let legacy = UuidCodec::new(UuidRepresentation::JavaLegacy, false);
        assert_eq!(encoded, legacy.encode(&uuid, &ctx).unwrap());
        assert_eq!(primitive.decode(&encoded, &ctx).unwrap().take::<Uuid>().ok(), Some(uuid));
    }

    #[test]
    fn uuid_forms() {
        let codecs = codecs();
        let ctx = CodecContext::new(&codecs);
        let uuid = Uuid::new();

        let as_string = UuidCodec::new(UuidRepresentation::Standard, true);
        let encoded = as_string.encode(&uuid, &ctx).unwrap();
        assert_eq!(encoded, Bson::String(uuid.to_string()));
        assert_eq!(as_string.decode(&encoded, &ctx).unwrap().take::<Uuid>().ok(), Some(uuid));

        let legacy = UuidCodec::new(UuidRepresentation::JavaLegacy, false);
        let encoded = legacy.encode(&uuid, &ctx).unwrap();
        assert!(matches!(&encoded, Bson::Binary(binary) if binary.bytes.len() == 16));
        assert_eq!(legacy.decode(&encoded, &ctx).unwrap().take::<Uuid>().ok(), Some(uuid));

        assert!(matches!(
            as_string.decode(&Bson::String("nope".into()), &ctx),
            Err(CodecError::InvalidUuid { .. })
        ));
    }
}
