use core::fmt;
use core::marker::PhantomData;

use bson::Bson;
use dm_reflect::Reflect;
use dm_reflect::info::{Type, Typed};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Codec, CodecContext};
use crate::CodecError;

/// Encodes a type through its `serde` implementations.
///
/// Useful for opaque types that already derive `Serialize` and
/// `Deserialize`. Register it with
/// [`CodecRegistry::register`](super::CodecRegistry::register).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bson::{Bson, doc};
/// use dm_codec::codec::{CodecRegistry, SerdeCodec};
/// use dm_codec::registry::TypeRegistry;
/// use dm_reflect::impl_opaque;
/// use dm_reflect::info::Typed;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Span {
///     start: i32,
///     end: i32,
/// }
/// impl_opaque!(Span);
///
/// let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
/// codecs.register(SerdeCodec::<Span>::new());
///
/// let span = Span { start: 1, end: 4 };
/// let encoded = codecs.encode_value(&span, &Span::type_ref()).unwrap();
/// assert_eq!(encoded, Bson::Document(doc! { "start": 1, "end": 4 }));
/// ```
pub struct SerdeCodec<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> SerdeCodec<T> {
    #[inline]
    pub const fn new() -> Self {
        Self { marker: PhantomData }
    }
}

impl<T> Default for SerdeCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SerdeCodec")
    }
}

impl<T: Typed + Serialize + DeserializeOwned> Codec for SerdeCodec<T> {
    #[inline]
    fn target(&self) -> Type {
        Type::of::<T>()
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        bson::to_bson(ctx.downcast::<T>(value)?).map_err(|err| CodecError::Serde {
            path: ctx.path(),
            message: err.to_string(),
        })
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        let decoded: T = bson::from_bson(value.clone()).map_err(|err| CodecError::Serde {
            path: ctx.path(),
            message: err.to_string(),
        })?;
        Ok(Box::new(decoded))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::doc;
    use dm_reflect::impl_opaque;
    use serde::{Deserialize, Serialize};

    use super::SerdeCodec;
    use crate::CodecError;
    use crate::codec::CodecRegistry;
    use crate::registry::TypeRegistry;
    use crate::testing::Address;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    struct Geo {
        lat: f64,
        lon: f64,
    }
    impl_opaque!(Geo);

    #[derive(dm_reflect::derive::Mapped, Debug, PartialEq, Default)]
    #[docmap(mapped, default)]
    struct Place {
        #[docmap(field)]
        name: String,
        #[docmap(field)]
        geo: Geo,
        #[docmap(field)]
        address: Option<Address>,
    }

    #[test]
    fn serde_fields() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        codecs.register(SerdeCodec::<Geo>::new());

        let place = Place {
            name: "pier".into(),
            geo: Geo { lat: 59.9, lon: 10.7 },
            address: None,
        };
        let document = codecs.to_document(&place).unwrap();
        assert_eq!(
            document,
            doc! { "name": "pier", "geo": { "lat": 59.9, "lon": 10.7 }, "address": null }
        );
        assert_eq!(codecs.from_document::<Place>(&document).unwrap(), place);

        let err = codecs
            .from_document::<Place>(&doc! { "geo": { "lat": "north" } })
            .unwrap_err();
        assert!(matches!(err, CodecError::Serde { ref path, .. } if path == "$.geo"));
    }
}
