use std::sync::Arc;

use bson::Document;
use thiserror::Error;

/// A failure reported by the storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("collection `{collection}` is unavailable: {message}")]
    Unavailable { collection: String, message: String },
    #[error("failed to create index `{index}` on `{collection}`: {message}")]
    Index {
        collection: String,
        index: String,
        message: String,
    },
    #[error("storage is closed")]
    Closed,
}

/// An index to create on a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexModel {
    pub keys: Document,
    pub name: String,
    pub unique: bool,
}

impl IndexModel {
    /// A unique ascending index on a single field.
    pub fn unique(field: &str, name: impl Into<String>) -> Self {
        let mut keys = Document::new();
        keys.insert(field, 1_i32);
        Self {
            keys,
            name: name.into(),
            unique: true,
        }
    }
}

/// A collection handle of the storage backend.
pub trait Collection: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn create_index(&self, index: IndexModel) -> Result<(), StorageError>;
}

/// The storage backend: hands out collections of a namespace.
pub trait Storage: Send + Sync + 'static {
    fn collection(&self, namespace: &str, name: &str) -> Result<Arc<dyn Collection>, StorageError>;

    /// Releases the backend. Collections handed out before stay valid
    /// handles but may fail afterwards.
    fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
