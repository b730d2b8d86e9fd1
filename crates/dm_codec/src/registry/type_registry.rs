use core::any::TypeId;
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use dm_reflect::info::{MappingMarker, TypeKind, TypeRef, Typed};
use dm_utils::TypeIdMap;

use super::BuildSession;
use crate::model::ModelNamespace;
use crate::schema::{EnumSchema, FieldDescriptor, ModelSchema, TypeSchema, build_type_schema};
use crate::{LookupError, SchemaError};

// -----------------------------------------------------------------------------
// RegistryEntry

/// What a registry entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Type,
    Model,
    Enum,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::Type => "type",
            EntryKind::Model => "model",
            EntryKind::Enum => "enum",
        })
    }
}

/// A cached schema.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Type(Arc<TypeSchema>),
    Model(Arc<ModelSchema>),
    Enum(Arc<EnumSchema>),
}

impl RegistryEntry {
    #[inline]
    pub fn kind(&self) -> EntryKind {
        match self {
            RegistryEntry::Type(_) => EntryKind::Type,
            RegistryEntry::Model(_) => EntryKind::Model,
            RegistryEntry::Enum(_) => EntryKind::Enum,
        }
    }

    /// The structural schema of a type or model entry.
    pub fn type_schema(&self) -> Option<&Arc<TypeSchema>> {
        match self {
            RegistryEntry::Type(schema) => Some(schema),
            RegistryEntry::Model(model) => Some(model.schema()),
            RegistryEntry::Enum(_) => None,
        }
    }
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A build-once cache of schemas, keyed by type identity.
///
/// Entries are only ever inserted, with two exceptions: a plain type entry is
/// upgraded in place once the same type is registered as a model, and the
/// models of a namespace whose registration failed fall back to plain types.
/// When two
/// threads build the same type concurrently, the first insertion wins and
/// both callers receive the stored schema.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use dm_codec::registry::TypeRegistry;
/// use dm_reflect::derive::Mapped;
/// use dm_reflect::info::Typed;
///
/// #[derive(Mapped, Default)]
/// #[docmap(mapped, default)]
/// struct Address {
///     #[docmap(field)]
///     city: String,
/// }
///
/// let registry = TypeRegistry::new();
/// let first = registry.get_or_build_type(&Address::type_ref()).unwrap().unwrap();
/// let again = registry.get_or_build_type(&Address::type_ref()).unwrap().unwrap();
///
/// assert!(Arc::ptr_eq(&first, &again));
/// assert_eq!(first.field("city").unwrap().ident(), "city");
/// ```
pub struct TypeRegistry {
    entries: RwLock<TypeIdMap<RegistryEntry>>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: RwLock::new(TypeIdMap::new()),
        }
    }

    /// Creates a registry holding every `#[docmap(auto_register)]` type.
    ///
    /// Types that fail to build are logged and skipped.
    #[cfg(feature = "auto_register")]
    pub fn auto_register() -> Self {
        let registry = Self::new();
        for type_ref in dm_reflect::auto_register::registered() {
            if let Err(err) = registry.register_type_ref(&type_ref) {
                log::warn!("failed to auto-register `{type_ref}`: {err}");
            }
        }
        registry
    }

    /// Builds the schema of `T`, whether it is a mapped type or enum.
    pub fn register<T: Typed>(&self) -> Result<(), SchemaError> {
        self.register_type_ref(&T::type_ref())
    }

    fn register_type_ref(&self, type_ref: &TypeRef) -> Result<(), SchemaError> {
        match type_ref.kind() {
            TypeKind::Enum(_) => self.get_or_build_enum(type_ref).map(drop),
            _ => match self.get_or_build_type(type_ref)? {
                Some(_) => Ok(()),
                None => Err(SchemaError::NotMapped {
                    ty: type_ref.path(),
                }),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Non-building lookups

    /// The cached entry of `id`.
    pub fn get(&self, id: TypeId) -> Option<RegistryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    #[inline]
    pub fn contains(&self, id: TypeId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Number of cached schemas.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The cached structural schema of a type or model.
    pub fn get_type(&self, id: TypeId) -> Option<Arc<TypeSchema>> {
        self.get(id).as_ref().and_then(RegistryEntry::type_schema).cloned()
    }

    /// The cached model schema of `type_ref`.
    pub fn get_model(&self, type_ref: &TypeRef) -> Result<Arc<ModelSchema>, LookupError> {
        let ty = type_ref.path();
        match self.get(type_ref.id()) {
            Some(RegistryEntry::Model(model)) => Ok(model),
            Some(entry) => Err(LookupError::EntryMismatch {
                ty,
                expected: EntryKind::Model,
                found: entry.kind(),
            }),
            None => Err(LookupError::ModelNotRegistered { ty }),
        }
    }

    /// Like [`get_model`](Self::get_model), but a missing or non-model entry
    /// is `None`.
    pub fn get_model_nullable(&self, type_ref: &TypeRef) -> Option<Arc<ModelSchema>> {
        match self.get(type_ref.id()) {
            Some(RegistryEntry::Model(model)) => Some(model),
            _ => None,
        }
    }

    /// The cached enum schema of `type_ref`.
    pub fn get_enum(&self, type_ref: &TypeRef) -> Result<Arc<EnumSchema>, LookupError> {
        match self.get(type_ref.id()) {
            Some(RegistryEntry::Enum(schema)) => Ok(schema),
            Some(entry) => Err(LookupError::EntryMismatch {
                ty: type_ref.path(),
                expected: EntryKind::Enum,
                found: entry.kind(),
            }),
            None => Err(LookupError::NotRegistered { ty: type_ref.path() }),
        }
    }

    // -------------------------------------------------------------------------
    // Building lookups

    /// Returns the schema of a mapped type, building it on first use.
    ///
    /// Types that are not marked as mapped yield `Ok(None)`, so arbitrary
    /// field types can be checked.
    pub fn get_or_build_type(&self, type_ref: &TypeRef) -> Result<Option<Arc<TypeSchema>>, SchemaError> {
        self.build_type_in(&mut BuildSession::new(), type_ref, None)
    }

    /// Returns the model schema of `type_ref` in `namespace`, building it on
    /// first use.
    ///
    /// A type cached as a plain type is upgraded to a model, reusing its
    /// schema. A model already bound to another namespace is an error.
    pub fn get_or_build_model(
        &self,
        type_ref: &TypeRef,
        namespace: &ModelNamespace,
    ) -> Result<Arc<ModelSchema>, SchemaError> {
        self.build_model_in(&mut BuildSession::new(), type_ref, namespace)?
            .ok_or(SchemaError::NotMapped { ty: type_ref.path() })
    }

    /// Returns the schema of a mapped enum, building it on first use.
    pub fn get_or_build_enum(&self, type_ref: &TypeRef) -> Result<Arc<EnumSchema>, SchemaError> {
        let TypeKind::Enum(describe) = type_ref.kind() else {
            return Err(SchemaError::NotAnEnum { ty: type_ref.path() });
        };
        if let Some(RegistryEntry::Enum(schema)) = self.get(type_ref.id()) {
            return Ok(schema);
        }

        let schema = Arc::new(EnumSchema::build(describe())?);
        log::debug!("built enum schema of `{type_ref}`");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_or_insert(type_ref.id(), || RegistryEntry::Enum(schema)) {
            RegistryEntry::Enum(schema) => Ok(schema.clone()),
            _ => Err(SchemaError::NotAnEnum { ty: type_ref.path() }),
        }
    }

    fn build_type_in(
        &self,
        session: &mut BuildSession,
        type_ref: &TypeRef,
        namespace: Option<&ModelNamespace>,
    ) -> Result<Option<Arc<TypeSchema>>, SchemaError> {
        let TypeKind::Mapped(describe) = type_ref.kind() else {
            return Ok(None);
        };
        if let Some(schema) = self.get_type(type_ref.id()) {
            return Ok(Some(schema));
        }
        let description = describe();
        if !description.is_mapped() || !session.enter(type_ref.id()) {
            return Ok(None);
        }

        let start = cfg!(all(debug_assertions, feature = "debug")).then(std::time::Instant::now);
        let built = build_type_schema(self, session, type_ref, &description, namespace);
        session.leave(type_ref.id());
        let schema = Arc::new(built?);

        match start {
            Some(start) => log::debug!("built schema of `{type_ref}` in {:?}", start.elapsed()),
            None => log::debug!("built schema of `{type_ref}`"),
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get_or_insert(type_ref.id(), || RegistryEntry::Type(schema.clone()));
        Ok(Some(entry.type_schema().cloned().unwrap_or(schema)))
    }

    fn build_model_in(
        &self,
        session: &mut BuildSession,
        type_ref: &TypeRef,
        namespace: &ModelNamespace,
    ) -> Result<Option<Arc<ModelSchema>>, SchemaError> {
        let ty = type_ref.path();
        let TypeKind::Mapped(describe) = type_ref.kind() else {
            return Ok(None);
        };

        let cached = self.get(type_ref.id());
        if let Some(RegistryEntry::Model(model)) = &cached {
            return check_namespace(model, namespace).map(Some);
        }

        let description = describe();
        let model_name = match description.marker() {
            MappingMarker::Unmapped => return Ok(None),
            MappingMarker::Model(name) if !name.is_empty() => name,
            MappingMarker::Model(_) | MappingMarker::Type => {
                return Err(SchemaError::MissingModelName { ty });
            }
        };

        let schema = match cached.as_ref().and_then(RegistryEntry::type_schema) {
            Some(schema) => {
                log::warn!("binding `{ty}`, cached as a plain type, to model `{model_name}`");
                // The cached schema was built without a namespace, so model
                // arguments of its fields are still plain types.
                if session.enter(type_ref.id()) {
                    for field in schema.fields() {
                        for arg in field.generic_args() {
                            self.resolve_argument(session, arg, Some(namespace));
                        }
                    }
                    session.leave(type_ref.id());
                }
                schema.clone()
            }
            None => {
                if !session.enter(type_ref.id()) {
                    return Ok(None);
                }
                let built = build_type_schema(self, session, type_ref, &description, Some(namespace));
                session.leave(type_ref.id());
                Arc::new(built?)
            }
        };

        let collection = namespace.collection(model_name)?;
        let model = Arc::new(ModelSchema::new(
            schema,
            model_name,
            namespace.name().to_owned(),
            collection,
        ));

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(RegistryEntry::Model(existing)) = entries.get(&type_ref.id()) {
            return check_namespace(existing, namespace).map(Some);
        }
        entries.insert(type_ref.id(), RegistryEntry::Model(model.clone()));
        drop(entries);

        log::debug!("registered model `{model_name}` for `{ty}` in `{}`", namespace.name());
        Ok(Some(model))
    }

    /// Turns every model bound to `namespace` back into a plain type entry.
    ///
    /// Used to roll back a namespace whose registration failed part way.
    pub(crate) fn unbind_namespace(&self, namespace: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut unbound = 0;
        for entry in entries.values_mut() {
            if let RegistryEntry::Model(model) = entry
                && model.namespace() == namespace
            {
                let schema = model.schema().clone();
                *entry = RegistryEntry::Type(schema);
                unbound += 1;
            }
        }
        unbound
    }

    /// Builds what a field of a type under construction refers to.
    ///
    /// The field's own type is mandatory and its errors propagate. Its type
    /// arguments are resolved best effort.
    pub(crate) fn resolve_field(
        &self,
        session: &mut BuildSession,
        field: &FieldDescriptor,
        namespace: Option<&ModelNamespace>,
    ) -> Result<(), SchemaError> {
        let declared = field.declared_type();
        if !session.is_building(declared.id()) {
            match declared.kind() {
                TypeKind::Mapped(_) => drop(self.build_type_in(session, declared, None)?),
                TypeKind::Enum(_) => drop(self.get_or_build_enum(declared)?),
                _ => {}
            }
        }

        for arg in field.generic_args() {
            self.resolve_argument(session, arg, namespace);
        }
        Ok(())
    }

    fn resolve_argument(&self, session: &mut BuildSession, arg: &TypeRef, namespace: Option<&ModelNamespace>) {
        if !session.is_building(arg.id()) {
            let result = match (arg.kind(), namespace) {
                (TypeKind::Mapped(describe), Some(namespace))
                    if matches!(describe().marker(), MappingMarker::Model(_)) =>
                {
                    self.build_model_in(session, arg, namespace).map(drop)
                }
                (TypeKind::Mapped(_), _) => self.build_type_in(session, arg, None).map(drop),
                (TypeKind::Enum(_), _) => self.get_or_build_enum(arg).map(drop),
                _ => Ok(()),
            };
            if let Err(err) = result {
                log::debug!("skipping type argument `{arg}`: {err}");
            }
        }

        for nested in arg.args() {
            self.resolve_argument(session, nested, namespace);
        }
    }
}

fn check_namespace(model: &Arc<ModelSchema>, namespace: &ModelNamespace) -> Result<Arc<ModelSchema>, SchemaError> {
    if model.namespace() == namespace.name() {
        Ok(model.clone())
    } else {
        Err(SchemaError::ModelRebound {
            ty: model.owner().path(),
            namespace: model.namespace().to_owned(),
        })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("TypeRegistry")
            .field("len", &entries.len())
            .finish_non_exhaustive()
    }
}
