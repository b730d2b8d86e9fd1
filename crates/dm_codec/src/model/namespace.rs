use core::fmt;
use std::sync::Arc;

use dm_reflect::info::Typed;

use super::{Collection, Storage, StorageError};
use crate::codec::{CodecRegistry, DocumentCodec};
use crate::registry::TypeRegistry;
use crate::schema::ModelSchema;
use crate::{CodecError, LookupError};

/// One registered schema namespace.
///
/// Holds the storage backend its models live in and the codec registry of
/// the namespace, which shares the [`TypeRegistry`] of every other
/// namespace but carries its own user codecs.
pub struct ModelNamespace {
    name: String,
    storage: Arc<dyn Storage>,
    codecs: Arc<CodecRegistry>,
}

impl ModelNamespace {
    pub(crate) fn new(name: String, storage: Arc<dyn Storage>, codecs: Arc<CodecRegistry>) -> Self {
        Self {
            name,
            storage,
            codecs,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    #[inline]
    pub fn codecs(&self) -> &Arc<CodecRegistry> {
        &self.codecs
    }

    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        self.codecs.types()
    }

    /// The collection a model is stored in.
    pub fn collection(&self, model_name: &str) -> Result<Arc<dyn Collection>, StorageError> {
        self.storage.collection(&self.name, model_name)
    }

    /// The model schema of `M`, if it was registered in this namespace.
    pub fn get_model<M: Typed>(&self) -> Result<Arc<ModelSchema>, LookupError> {
        let model = self.types().get_model(&M::type_ref())?;
        if model.namespace() == self.name {
            Ok(model)
        } else {
            Err(LookupError::ModelNotRegistered { ty: M::type_path() })
        }
    }

    /// A typed codec of `M` using this namespace's codecs.
    pub fn document_codec<M: Typed>(&self) -> Result<DocumentCodec<M>, CodecError> {
        self.codecs.document_codec::<M>()
    }
}

impl fmt::Debug for ModelNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelNamespace")
            .field("name", &self.name)
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}
