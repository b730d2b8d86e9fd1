use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use bson::{Bson, Document};
use dm_reflect::info::{Type, Typed};
use dm_reflect::{AccessError, Reflect};

use super::{Codec, CodecContext, CodecRegistry, ValueCodec};
use crate::CodecError;
use crate::schema::{ConstructorSpec, TypeSchema};

// -----------------------------------------------------------------------------
// TypedDocumentCodec

/// Codec of a mapped type, built from its [`TypeSchema`].
///
/// Types with a designated constructor are decoded by collecting the bound
/// fields and calling the constructor once the whole document has been
/// read. Other types are created with their no-argument constructor and
/// filled field by field; a type without one can still be encoded, but
/// decoding it fails.
///
/// Encoding walks the fields in declaration order and never writes `_id`,
/// which only the storage layer assigns.
///
/// A null leaves a `use_default` field untouched and clears an `Option`
/// field. On any other field it fails with [`CodecError::NullNotAllowed`]
/// rather than being skipped.
#[derive(Debug, Clone)]
pub struct TypedDocumentCodec {
    schema: Arc<TypeSchema>,
}

impl TypedDocumentCodec {
    #[inline]
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self { schema }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    fn encode_fields(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Document, CodecError> {
        let mut document = Document::new();
        for field in self.schema.fields() {
            if field.is_id() {
                continue;
            }
            let ctx = ctx.child(field.name());
            let encoded = match field.read(value).map_err(|err| ctx.access_error(err))? {
                Some(value) => ValueCodec::write_value(value, field.declared_type(), &ctx)?,
                None => Bson::Null,
            };
            document.insert(field.name(), encoded);
        }
        Ok(document)
    }

    fn decode_with_default(
        &self,
        document: &Document,
        ctx: &CodecContext<'_>,
        default: fn() -> Box<dyn Reflect>,
    ) -> Result<Box<dyn Reflect>, CodecError> {
        let mut instance = default();
        for (name, value) in document {
            let Some(field) = self.schema.field(name) else {
                continue;
            };
            let ctx = ctx.child(field.name());
            let written = match ValueCodec::read_value(value, Some(field.declared_type()), &ctx)? {
                Some(value) => field.write(&mut *instance, Some(value)),
                None if field.use_fallback_on_null() => continue,
                None if field.is_nullable() => field.write(&mut *instance, None),
                None => {
                    return Err(CodecError::NullNotAllowed {
                        path: ctx.path(),
                        ty: field.generic_type().path(),
                    });
                }
            };
            written.map_err(|err| ctx.access_error(err))?;
        }
        Ok(instance)
    }

    fn decode_with_constructor(
        &self,
        document: &Document,
        ctx: &CodecContext<'_>,
        constructor: &ConstructorSpec,
    ) -> Result<Box<dyn Reflect>, CodecError> {
        let mut args: Vec<Option<Box<dyn Reflect>>> =
            constructor.required_fields().iter().map(|_| None).collect();

        for (name, value) in document {
            let (Some(position), Some(field)) = (constructor.position_of(name), self.schema.field(name)) else {
                continue;
            };
            let ctx = ctx.child(field.name());
            if let Some(value) = ValueCodec::read_value(value, Some(field.declared_type()), &ctx)? {
                args[position] = field.lift(Some(value)).map_err(|err| ctx.access_error(err))?;
            }
        }

        constructor.invoke(args).map_err(|err| ctx.access_error(err))
    }
}

impl Codec for TypedDocumentCodec {
    #[inline]
    fn target(&self) -> Type {
        *self.schema.owner().ty()
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        self.encode_fields(value, ctx).map(Bson::Document)
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match value {
            Bson::Document(document) => self.decode_document(document, ctx),
            _ => Err(ctx.unexpected("a document", value)),
        }
    }

    fn decode_document(&self, document: &Document, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match (self.schema.constructor(), self.schema.default_constructor()) {
            (Some(constructor), _) => self.decode_with_constructor(document, ctx, constructor),
            (None, Some(default)) => self.decode_with_default(document, ctx, default),
            (None, None) => Err(CodecError::NoDefaultConstructor {
                ty: self.schema.owner().path(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// DocumentCodec

/// A typed handle on the codec of `T`.
///
/// Created by [`CodecRegistry::document_codec`].
pub struct DocumentCodec<T> {
    codecs: Arc<CodecRegistry>,
    codec: Arc<dyn Codec>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Typed> DocumentCodec<T> {
    pub(crate) fn new(codecs: Arc<CodecRegistry>, codec: Arc<dyn Codec>) -> Self {
        Self {
            codecs,
            codec,
            marker: PhantomData,
        }
    }

    /// The erased codec.
    #[inline]
    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn encode(&self, value: &T) -> Result<Document, CodecError> {
        let ctx = CodecContext::new(&self.codecs);
        match self.codec.encode(value, &ctx)? {
            Bson::Document(document) => Ok(document),
            other => Err(ctx.unexpected("a document", &other)),
        }
    }

    pub fn decode(&self, document: &Document) -> Result<T, CodecError> {
        let ctx = CodecContext::new(&self.codecs);
        self.codec
            .decode_document(document, &ctx)?
            .take::<T>()
            .map_err(|value| {
                ctx.access_error(AccessError::TypeMismatch {
                    expected: T::type_path(),
                    found: value.reflect_type_path(),
                })
            })
    }
}

impl<T> Clone for DocumentCodec<T> {
    fn clone(&self) -> Self {
        Self {
            codecs: self.codecs.clone(),
            codec: self.codec.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DocumentCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCodec")
            .field("target", &self.codec.target())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::oid::ObjectId;
    use bson::{Bson, doc};
    use dm_reflect::AccessError;

    use crate::CodecError;
    use crate::codec::CodecRegistry;
    use crate::registry::TypeRegistry;
    use crate::testing::*;

    fn codecs() -> Arc<CodecRegistry> {
        Arc::new(CodecRegistry::new(Arc::new(TypeRegistry::new())))
    }

    fn user() -> User {
        User {
            id: Some(ObjectId::new()),
            email: "a@b.com".into(),
            status: Status::Active,
            score: 42,
            address: Some(Address {
                city: "Oslo".into(),
                zip: None,
            }),
            tags: vec!["x".into(), "y".into()],
            cache: vec![1, 2, 3],
        }
    }

    #[test]
    fn encode_skips_id() {
        let codecs = codecs();
        let document = codecs.to_document(&user()).unwrap();
        assert_eq!(
            document,
            doc! {
                "email": "a@b.com",
                "status": "A",
                "score": 42,
                "address": { "city": "Oslo", "zip": null },
                "tags": ["x", "y"],
            }
        );
    }

    #[test]
    fn round_trip_with_external_id() {
        let codecs = codecs();
        let original = user();
        let mut document = codecs.to_document(&original).unwrap();
        document.insert("_id", original.id.unwrap());

        let decoded = codecs.from_document::<User>(&document).unwrap();
        assert_eq!(decoded.id, original.id);
        assert_eq!(decoded.email, original.email);
        assert_eq!(decoded.status, original.status);
        assert_eq!(decoded.score, original.score);
        assert_eq!(decoded.address, original.address);
        assert_eq!(decoded.tags, original.tags);
        assert!(decoded.cache.is_empty());
    }

    #[test]
    fn null_fallback_keeps_default() {
        let codecs = codecs();
        let document = doc! { "email": "a@b.com", "status": "B", "score": null, "address": null };
        let decoded = codecs.from_document::<User>(&document).unwrap();
        assert_eq!(decoded.score, 10);
        assert_eq!(decoded.address, None);
        assert_eq!(decoded.status, Status::Banned);

        let document = doc! { "email": "a@b.com", "score": 3 };
        assert_eq!(codecs.from_document::<User>(&document).unwrap().score, 3);
    }

    #[test]
    fn null_into_required_field() {
        let codecs = codecs();
        let err = codecs
            .from_document::<User>(&doc! { "email": null })
            .unwrap_err();
        assert!(matches!(err, CodecError::NullNotAllowed { ref path, .. } if path == "$.email"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let codecs = codecs();
        let decoded = codecs
            .from_document::<User>(&doc! { "email": "a@b.com", "legacy": { "x": 1 } })
            .unwrap();
        assert_eq!(decoded.email, "a@b.com");
    }

    #[test]
    fn nested_error_path() {
        let codecs = codecs();
        let err = codecs
            .from_document::<User>(&doc! { "address": { "city": 5 } })
            .unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedElement { ref path, .. } if path == "$.address.city"));
    }

    #[test]
    fn designated_constructor_runs_after_traversal() {
        let codecs = codecs();
        let point = Point::new(3, 4);
        let document = codecs.to_document(&point).unwrap();
        assert_eq!(document, doc! { "x": 3, "y": 4, "label": "3,4" });

        let decoded = codecs
            .from_document::<Point>(&doc! { "label": "ignored", "y": 4, "x": 3 })
            .unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    fn designated_constructor_missing_argument() {
        let codecs = codecs();
        let err = codecs.from_document::<Point>(&doc! { "x": 1 }).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Access {
                source: AccessError::MissingArgument { field: "y" },
                ..
            }
        ));
    }

    #[test]
    fn optional_constructor_argument() {
        let codecs = codecs();
        let pair = codecs.from_document::<Pair>(&doc! { "a": 1 }).unwrap();
        assert_eq!(pair, Pair::new(1, None));
        let pair = codecs.from_document::<Pair>(&doc! { "a": 1, "b": "x" }).unwrap();
        assert_eq!(pair, Pair::new(1, Some("x".into())));
    }

    #[test]
    fn missing_default_constructor() {
        let codecs = codecs();
        let document = codecs.to_document(&NoDefault { value: 1 }).unwrap();
        assert_eq!(document, doc! { "value": 1 });
        assert!(matches!(
            codecs.from_document::<NoDefault>(&document),
            Err(CodecError::NoDefaultConstructor { .. })
        ));
    }

    #[test]
    fn cyclic_graphs_encode() {
        let codecs = codecs();
        let tree = Node {
            name: "root".into(),
            children: vec![Node {
                name: "leaf".into(),
                children: vec![],
            }],
        };
        let document = codecs.to_document(&tree).unwrap();
        assert_eq!(
            document,
            doc! { "name": "root", "children": [{ "name": "leaf", "children": [] }] }
        );
        assert_eq!(codecs.from_document::<Node>(&document).unwrap(), tree);
    }

    #[test]
    fn document_codec_handle() {
        let codecs = codecs();
        let handle = codecs.document_codec::<Address>().unwrap();
        let address = Address {
            city: "Bergen".into(),
            zip: Some(5003),
        };
        let document = handle.encode(&address).unwrap();
        assert_eq!(document.get("zip"), Some(&Bson::Int32(5003)));
        assert_eq!(handle.decode(&document).unwrap(), address);
    }
}
