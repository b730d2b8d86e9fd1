use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bson::{Bson, Document};
use dm_reflect::info::{PrimitiveKind, TypeKind, TypeRef, Typed};
use dm_reflect::{AccessError, Reflect};
use dm_utils::TypeIdMap;

use super::{
    Codec, CodecContext, CodecSettings, DocumentCodec, EnumCodec, ListCodec, MapCodec, OptionCodec,
    PrimitiveCodec, TypedDocumentCodec, UuidCodec,
};
use crate::CodecError;
use crate::registry::TypeRegistry;

/// Resolves and caches the codec of every type.
///
/// Resolution order for a type that is not cached yet:
///
/// 1. mapped types get a [`TypedDocumentCodec`] over their schema,
/// 2. mapped enums get an [`EnumCodec`],
/// 3. `Vec`, `Option` and string-keyed maps get container codecs,
/// 4. built-in scalars get a [`PrimitiveCodec`] or [`UuidCodec`],
/// 5. anything else, including opaque types and types derived without a
///    mapping marker, uses a codec added with
///    [`register_codec`](Self::register_codec).
///
/// Each type is resolved once; concurrent first lookups converge on the
/// first stored codec.
pub struct CodecRegistry {
    types: Arc<TypeRegistry>,
    settings: CodecSettings,
    custom: RwLock<TypeIdMap<Arc<dyn Codec>>>,
    cache: RwLock<TypeIdMap<Arc<dyn Codec>>>,
}

impl CodecRegistry {
    /// Creates a registry with [default settings](CodecSettings::default).
    #[inline]
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self::with_settings(types, CodecSettings::default())
    }

    pub fn with_settings(types: Arc<TypeRegistry>, settings: CodecSettings) -> Self {
        Self {
            types,
            settings,
            custom: RwLock::new(TypeIdMap::new()),
            cache: RwLock::new(TypeIdMap::new()),
        }
    }

    /// The schema cache codecs are built from.
    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    #[inline]
    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Adds a codec for its [`target`](Codec::target) type.
    ///
    /// Returns `false` if a codec was already registered for that type.
    pub fn register_codec(&self, codec: Arc<dyn Codec>) -> bool {
        let id = codec.target().id();
        self.custom
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .try_insert(id, || codec)
    }

    /// Adds a codec value, see [`register_codec`](Self::register_codec).
    #[inline]
    pub fn register<C: Codec>(&self, codec: C) -> bool {
        self.register_codec(Arc::new(codec))
    }

    /// The codec of `type_ref`, resolving it on first use.
    pub fn get(&self, type_ref: &TypeRef) -> Result<Arc<dyn Codec>, CodecError> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_ref.id())
            .cloned();
        if let Some(codec) = cached {
            log::trace!("codec cache hit for `{type_ref}`");
            return Ok(codec);
        }

        log::trace!("codec cache miss for `{type_ref}`");
        let codec = self.build(type_ref)?;
        let stored = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_ref.id(), || codec)
            .clone();
        Ok(stored)
    }

    /// The codec of `T`.
    #[inline]
    pub fn get_of<T: Typed>(&self) -> Result<Arc<dyn Codec>, CodecError> {
        self.get(&T::type_ref())
    }

    fn custom(&self, type_ref: &TypeRef) -> Result<Arc<dyn Codec>, CodecError> {
        self.custom
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_ref.id())
            .cloned()
            .ok_or(CodecError::NoCodec { ty: type_ref.path() })
    }

    fn argument(type_ref: &TypeRef, index: usize) -> Result<TypeRef, CodecError> {
        type_ref
            .args()
            .get(index)
            .cloned()
            .ok_or(CodecError::NoCodec { ty: type_ref.path() })
    }

    fn build(&self, type_ref: &TypeRef) -> Result<Arc<dyn Codec>, CodecError> {
        let ty = *type_ref.ty();
        let codec: Arc<dyn Codec> = match type_ref.kind() {
            TypeKind::Mapped(_) => match self.types.get_or_build_type(type_ref)? {
                Some(schema) => Arc::new(TypedDocumentCodec::new(schema)),
                None => return self.custom(type_ref),
            },
            TypeKind::Enum(_) => Arc::new(EnumCodec::new(self.types.get_or_build_enum(type_ref)?)),
            TypeKind::List(ops) => Arc::new(ListCodec::new(ty, *ops, Self::argument(type_ref, 0)?)),
            TypeKind::Map(ops) => Arc::new(MapCodec::new(ty, *ops, Self::argument(type_ref, 1)?)),
            TypeKind::Option(ops) => Arc::new(OptionCodec::new(ty, *ops, Self::argument(type_ref, 0)?)),
            TypeKind::Primitive(PrimitiveKind::Uuid) => Arc::new(UuidCodec::from_settings(&self.settings)),
            TypeKind::Primitive(kind) => Arc::new(PrimitiveCodec::new(ty, *kind)),
            TypeKind::Opaque => return self.custom(type_ref),
        };
        log::debug!("built {} codec for `{type_ref}`", type_ref.kind().label());
        Ok(codec)
    }

    /// A typed handle on the codec of `T`.
    pub fn document_codec<T: Typed>(self: &Arc<Self>) -> Result<DocumentCodec<T>, CodecError> {
        let codec = self.get_of::<T>()?;
        Ok(DocumentCodec::new(self.clone(), codec))
    }

    /// Encodes `value` as a top-level document.
    pub fn to_document<T: Typed>(&self, value: &T) -> Result<Document, CodecError> {
        let ctx = CodecContext::new(self);
        match self.get_of::<T>()?.encode(value, &ctx)? {
            Bson::Document(document) => Ok(document),
            other => Err(ctx.unexpected("a document", &other)),
        }
    }

    /// Decodes a top-level document into `T`.
    pub fn from_document<T: Typed>(&self, document: &Document) -> Result<T, CodecError> {
        let ctx = CodecContext::new(self);
        self.get_of::<T>()?
            .decode_document(document, &ctx)?
            .take::<T>()
            .map_err(|value| {
                ctx.access_error(AccessError::TypeMismatch {
                    expected: T::type_path(),
                    found: value.reflect_type_path(),
                })
            })
    }

    /// Encodes a single value of `type_ref`.
    pub fn encode_value(&self, value: &dyn Reflect, type_ref: &TypeRef) -> Result<Bson, CodecError> {
        let ctx = CodecContext::new(self);
        self.get(type_ref)?.encode(value, &ctx)
    }

    /// Decodes a single value of `type_ref`, `None` for a null.
    pub fn decode_value(&self, value: &Bson, type_ref: &TypeRef) -> Result<Option<Box<dyn Reflect>>, CodecError> {
        let ctx = CodecContext::new(self);
        super::ValueCodec::read_value(value, Some(type_ref), &ctx)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.cache.read().unwrap_or_else(PoisonError::into_inner).len();
        let custom = self.custom.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("CodecRegistry")
            .field("settings", &self.settings)
            .field("cached", &cached)
            .field("custom", &custom)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::{Bson, Uuid, doc};
    use dm_reflect::info::Typed;

    use super::CodecRegistry;
    use crate::CodecError;
    use crate::codec::CodecSettings;
    use crate::registry::TypeRegistry;
    use crate::testing::*;

    #[test]
    fn codecs_are_cached() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let first = codecs.get_of::<User>().unwrap();
        let again = codecs.get_of::<User>().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(first.target().is::<User>());
    }

    #[test]
    fn concurrent_lookups_converge() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let resolved: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| codecs.get_of::<User>())).collect();
            handles.into_iter().map(|handle| handle.join().unwrap().unwrap()).collect()
        });
        let stored = codecs.get_of::<User>().unwrap();
        assert!(resolved.iter().all(|codec| Arc::ptr_eq(codec, &stored)));
    }

    #[test]
    fn opaque_types_need_a_codec() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        assert!(matches!(
            codecs.to_document(&Invoice { total: Cents(5) }),
            Err(CodecError::NoCodec { .. })
        ));

        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        assert!(codecs.register(CentsCodec));
        assert!(!codecs.register(CentsCodec));
        let document = codecs.to_document(&Invoice { total: Cents(5) }).unwrap();
        assert_eq!(document, doc! { "total": 5_i64 });
        assert_eq!(codecs.from_document::<Invoice>(&document).unwrap().total, Cents(5));
    }

    #[test]
    fn schema_errors_surface_lazily() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        assert!(matches!(
            codecs.get_of::<Repeated>(),
            Err(CodecError::Schema(_))
        ));
    }

    #[test]
    fn uuid_settings() {
        let uuid = Uuid::new();
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let encoded = codecs.encode_value(&uuid, &Uuid::type_ref()).unwrap();
        assert_eq!(encoded, Bson::String(uuid.to_string()));

        let settings = CodecSettings::default().with_uuid_as_string(false);
        let codecs = CodecRegistry::with_settings(Arc::new(TypeRegistry::new()), settings);
        let encoded = codecs.encode_value(&uuid, &Uuid::type_ref()).unwrap();
        assert!(matches!(encoded, Bson::Binary(_)));
        let decoded = codecs.decode_value(&encoded, &Uuid::type_ref()).unwrap().unwrap();
        assert_eq!(decoded.take::<Uuid>().ok(), Some(uuid));
    }

    #[test]
    fn user_scenario() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let id = bson::oid::ObjectId::new();
        let user = User {
            id: Some(id),
            email: "a@b.com".into(),
            status: Status::Active,
            ..User::default()
        };

        let document = codecs.to_document(&user).unwrap();
        assert_eq!(document.get_str("email").unwrap(), "a@b.com");
        assert_eq!(document.get_str("status").unwrap(), "A");
        assert!(!document.contains_key("_id"));

        let mut stored = document.clone();
        stored.insert("_id", id);
        let decoded = codecs.from_document::<User>(&stored).unwrap();
        assert_eq!(decoded.id, Some(id));
        assert_eq!(decoded.email, user.email);
        assert_eq!(decoded.status, user.status);
    }
}
