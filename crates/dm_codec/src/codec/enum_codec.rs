use std::sync::Arc;

use bson::Bson;
use dm_reflect::Reflect;
use dm_reflect::info::Type;

use super::{Codec, CodecContext};
use crate::CodecError;
use crate::schema::EnumSchema;

/// Codec of a mapped enum, as the external string of each variant.
#[derive(Debug, Clone)]
pub struct EnumCodec {
    schema: Arc<EnumSchema>,
}

impl EnumCodec {
    #[inline]
    pub fn new(schema: Arc<EnumSchema>) -> Self {
        Self { schema }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<EnumSchema> {
        &self.schema
    }
}

impl Codec for EnumCodec {
    #[inline]
    fn target(&self) -> Type {
        *self.schema.ty()
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        let external = self
            .schema
            .external_value(value)
            .map_err(|err| ctx.access_error(err))?;
        Ok(Bson::String(external.to_owned()))
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        let Bson::String(external) = value else {
            return Err(ctx.unexpected("a string", value));
        };
        self.schema
            .constant(external)
            .ok_or_else(|| CodecError::UnknownEnumValue {
                path: ctx.path(),
                ty: self.schema.ty().path(),
                value: external.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::Bson;
    use dm_reflect::info::Typed;

    use super::EnumCodec;
    use crate::CodecError;
    use crate::codec::{Codec, CodecContext, CodecRegistry};
    use crate::registry::TypeRegistry;
    use crate::testing::Status;

    #[test]
    fn every_variant_round_trips() {
        let types = Arc::new(TypeRegistry::new());
        let codec = EnumCodec::new(types.get_or_build_enum(&Status::type_ref()).unwrap());
        let codecs = CodecRegistry::new(types);
        let ctx = CodecContext::new(&codecs);

        for status in [Status::Active, Status::Banned] {
            let encoded = codec.encode(&status, &ctx).unwrap();
            assert_eq!(codec.decode(&encoded, &ctx).unwrap().take::<Status>().ok(), Some(status));
        }
        assert_eq!(codec.encode(&Status::Banned, &ctx).unwrap(), Bson::String("B".into()));
    }

    #[test]
    fn unknown_values() {
        let types = Arc::new(TypeRegistry::new());
        let codec = EnumCodec::new(types.get_or_build_enum(&Status::type_ref()).unwrap());
        let codecs = CodecRegistry::new(types);
        let ctx = CodecContext::new(&codecs);

        assert!(matches!(
            codec.decode(&Bson::String("Active".into()), &ctx),
            Err(CodecError::UnknownEnumValue { ref value, .. }) if value == "Active"
        ));
        assert!(matches!(
            codec.decode(&Bson::Int32(0), &ctx),
            Err(CodecError::UnexpectedElement { .. })
        ));
    }
}
