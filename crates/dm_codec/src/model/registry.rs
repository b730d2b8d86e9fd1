use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use dm_reflect::info::{TypeRef, Typed};
use dm_utils::hash::HashMap;

use super::{IndexModel, ModelNamespace, Storage};
use crate::codec::{Codec, CodecRegistry, CodecSettings};
use crate::registry::TypeRegistry;
use crate::schema::ModelSchema;
use crate::{LookupError, SchemaError};

/// Registers schema namespaces and their models on a storage backend.
///
/// All namespaces share one [`TypeRegistry`], so a type is bound to at most
/// one namespace as a model.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use dm_codec::model::{Collection, IndexModel, ModelRegistry, Storage, StorageError};
/// use dm_reflect::derive::Mapped;
/// use dm_reflect::info::Typed;
///
/// struct Discard(String);
///
/// impl Collection for Discard {
///     fn name(&self) -> &str {
///         &self.0
///     }
///
///     fn create_index(&self, _: IndexModel) -> Result<(), StorageError> {
///         Ok(())
///     }
/// }
///
/// struct NoStorage;
///
/// impl Storage for NoStorage {
///     fn collection(&self, _: &str, name: &str) -> Result<Arc<dyn Collection>, StorageError> {
///         Ok(Arc::new(Discard(name.to_owned())))
///     }
/// }
///
/// #[derive(Mapped, Default)]
/// #[docmap(model = "accounts", default)]
/// struct Account {
///     #[docmap(field, unique)]
///     login: String,
/// }
///
/// let models = ModelRegistry::new(Arc::new(NoStorage));
/// models.new_schema("app", &[Account::type_ref()]).unwrap();
///
/// let account = models.get_model::<Account>().unwrap();
/// assert_eq!(account.collection().name(), "accounts");
/// assert_eq!(account.first_unique_field().unwrap(), "login");
/// ```
pub struct ModelRegistry {
    storage: Arc<dyn Storage>,
    types: Arc<TypeRegistry>,
    settings: CodecSettings,
    namespaces: RwLock<HashMap<String, Arc<ModelNamespace>>>,
}

impl ModelRegistry {
    /// Creates a registry with its own [`TypeRegistry`].
    #[inline]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_settings(storage, Arc::new(TypeRegistry::new()), CodecSettings::default())
    }

    pub fn with_settings(storage: Arc<dyn Storage>, types: Arc<TypeRegistry>, settings: CodecSettings) -> Self {
        Self {
            storage,
            types,
            settings,
            namespaces: RwLock::new(HashMap::default()),
        }
    }

    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Registers namespace `name` holding `models`.
    pub fn new_schema(&self, name: &str, models: &[TypeRef]) -> Result<Arc<ModelNamespace>, SchemaError> {
        self.new_schema_with_codecs(name, Vec::new(), models)
    }

    /// Registers namespace `name` holding `models`, with extra codecs
    /// available to its models only.
    ///
    /// Every model is built and gets one unique index per unique field.
    /// Nothing is kept registered under `name` if any step fails: models
    /// bound earlier in the call fall back to plain types and may be
    /// registered in another namespace. Indexes already created on the
    /// storage backend are left in place.
    pub fn new_schema_with_codecs(
        &self,
        name: &str,
        codecs: Vec<Arc<dyn Codec>>,
        models: &[TypeRef],
    ) -> Result<Arc<ModelNamespace>, SchemaError> {
        let start = Instant::now();

        let registry = Arc::new(CodecRegistry::with_settings(self.types.clone(), self.settings.clone()));
        for codec in codecs {
            if !registry.register_codec(codec.clone()) {
                log::warn!("ignoring second codec for `{}` in `{name}`", codec.target());
            }
        }
        let namespace = Arc::new(ModelNamespace::new(name.to_owned(), self.storage.clone(), registry));

        {
            let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
            if namespaces.contains_key(name) {
                return Err(SchemaError::DuplicateNamespace { name: name.to_owned() });
            }
            namespaces.insert(name.to_owned(), namespace.clone());
        }

        if let Err(err) = self.register_models(&namespace, models) {
            let unbound = self.types.unbind_namespace(name);
            log::debug!("rolled back schema `{name}`, unbinding {unbound} models: {err}");
            self.namespaces
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(name);
            return Err(err);
        }

        log::debug!(
            "registered schema `{name}` with {} models in {:?}",
            models.len(),
            start.elapsed()
        );
        Ok(namespace)
    }

    fn register_models(&self, namespace: &ModelNamespace, models: &[TypeRef]) -> Result<(), SchemaError> {
        for type_ref in models {
            let model = self.types.get_or_build_model(type_ref, namespace)?;
            for field in model.unique_fields() {
                let index = IndexModel::unique(field, model.unique_index_name(field));
                model.collection().create_index(index)?;
            }
        }
        Ok(())
    }

    /// The namespace registered as `name`.
    pub fn namespace(&self, name: &str) -> Option<Arc<ModelNamespace>> {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// The model schema of `M`.
    pub fn get_model<M: Typed>(&self) -> Result<Arc<ModelSchema>, LookupError> {
        self.types.get_model(&M::type_ref())
    }

    /// The model schema of `M`, `None` if it is not registered as a model.
    pub fn get_model_nullable<M: Typed>(&self) -> Option<Arc<ModelSchema>> {
        self.types.get_model_nullable(&M::type_ref())
    }

    /// Closes the storage backend and forgets every namespace.
    ///
    /// Built schemas stay cached in the [`TypeRegistry`].
    pub fn close(&self) -> Result<(), super::StorageError> {
        self.namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.storage.close()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ModelRegistry")
            .field("namespaces", &namespaces.keys().collect::<Vec<_>>())
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::doc;
    use dm_reflect::info::Typed;

    use super::ModelRegistry;
    use crate::model::{IndexModel, Storage, StorageError};
    use crate::testing::*;
    use crate::{LookupError, SchemaError};

    #[test]
    fn unique_indexes_are_created() {
        let storage = Arc::new(MemoryStorage::default());
        let models = ModelRegistry::new(storage.clone());
        models.new_schema("app", &[User::type_ref(), Team::type_ref()]).unwrap();

        let indexes = storage.indexes("app", "users");
        assert_eq!(indexes, [IndexModel::unique("email", "users_email_key")]);
        assert_eq!(indexes[0].keys, doc! { "email": 1 });
        assert!(storage.indexes("app", "teams").is_empty());
    }

    #[test]
    fn duplicate_namespace() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        let first = models.new_schema("app", &[]).unwrap();
        assert_eq!(
            models.new_schema("app", &[]).unwrap_err(),
            SchemaError::DuplicateNamespace { name: "app".to_owned() }
        );
        assert!(Arc::ptr_eq(&models.namespace("app").unwrap(), &first));
    }

    #[test]
    fn failed_schema_is_not_kept() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        assert!(matches!(
            models.new_schema("app", &[Address::type_ref()]),
            Err(SchemaError::MissingModelName { .. })
        ));
        assert!(models.namespace("app").is_none());
        models.new_schema("app", &[User::type_ref()]).unwrap();
    }

    #[test]
    fn failed_schema_unbinds_its_models() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        assert!(matches!(
            models.new_schema("app", &[User::type_ref(), Address::type_ref()]),
            Err(SchemaError::MissingModelName { .. })
        ));
        assert!(models.namespace("app").is_none());
        assert!(models.get_model_nullable::<User>().is_none());
        assert!(models.types().get_type(User::type_ref().id()).is_some());

        models.new_schema("other", &[User::type_ref()]).unwrap();
        assert_eq!(models.get_model::<User>().unwrap().namespace(), "other");
    }

    #[test]
    fn storage_errors_propagate() {
        let storage = Arc::new(MemoryStorage::default());
        storage.close().unwrap();
        let models = ModelRegistry::new(storage);
        assert_eq!(
            models.new_schema("app", &[User::type_ref()]).unwrap_err(),
            SchemaError::Storage(StorageError::Closed)
        );
    }

    #[test]
    fn model_lookups() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        assert_eq!(
            models.get_model::<User>().unwrap_err(),
            LookupError::ModelNotRegistered { ty: User::type_ref().path() }
        );
        assert!(models.get_model_nullable::<User>().is_none());

        let namespace = models.new_schema("app", &[User::type_ref()]).unwrap();
        let model = models.get_model::<User>().unwrap();
        assert!(Arc::ptr_eq(&namespace.get_model::<User>().unwrap(), &model));
        assert_eq!(model.collection().name(), "users");

        let other = models.new_schema("other", &[]).unwrap();
        assert!(matches!(
            other.get_model::<User>(),
            Err(LookupError::ModelNotRegistered { .. })
        ));
    }

    #[test]
    fn first_unique_field() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        models
            .new_schema("app", &[User::type_ref(), Team::type_ref(), Login::type_ref()])
            .unwrap();

        assert_eq!(models.get_model::<User>().unwrap().first_unique_field(), Ok("email"));
        assert_eq!(
            models.get_model::<Team>().unwrap().first_unique_field(),
            Err(LookupError::NoUniqueField { model: "teams" })
        );
        assert_eq!(
            models.get_model::<Login>().unwrap().first_unique_field(),
            Err(LookupError::MultipleUniqueFields {
                model: "logins",
                fields: vec!["user", "token"],
            })
        );
    }

    #[test]
    fn field_values() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        models.new_schema("app", &[User::type_ref()]).unwrap();
        let model = models.get_model::<User>().unwrap();

        let user = User {
            email: "a@b.com".into(),
            ..User::default()
        };
        let email = model.field_value(&user, "email").unwrap();
        assert_eq!(email.downcast_ref::<String>().map(String::as_str), Some("a@b.com"));
        assert_eq!(
            model.field_value(&user, "_id").unwrap_err(),
            LookupError::NullField {
                ty: User::type_ref().path(),
                field: "_id",
            }
        );
        assert!(matches!(
            model.field_value(&user, "cache"),
            Err(LookupError::UnknownField { .. })
        ));
    }

    #[test]
    fn namespace_codecs() {
        let models = ModelRegistry::new(Arc::new(MemoryStorage::default()));
        let namespace = models
            .new_schema_with_codecs("billing", vec![Arc::new(CentsCodec)], &[Ledger::type_ref()])
            .unwrap();

        let codec = namespace.document_codec::<Ledger>().unwrap();
        let ledger = Ledger {
            id: None,
            owner: "ops".into(),
            balance: Cents(120),
        };
        let document = codec.encode(&ledger).unwrap();
        assert_eq!(document, doc! { "owner": "ops", "balance": 120_i64 });
        assert_eq!(codec.decode(&document).unwrap(), ledger);
    }

    #[test]
    fn close_forgets_namespaces() {
        let storage = Arc::new(MemoryStorage::default());
        let models = ModelRegistry::new(storage.clone());
        models.new_schema("app", &[User::type_ref()]).unwrap();
        models.close().unwrap();
        assert!(models.namespace("app").is_none());
        assert!(storage.is_closed());
        assert!(models.get_model::<User>().is_ok());
    }
}
