use core::fmt;
use std::sync::Arc;

use bson::uuid::UuidRepresentation;
use bson::{Bson, Document};
use dm_reflect::Reflect;

// -----------------------------------------------------------------------------
// ValueTransformer

/// A hook applied to every value decoded by [`ValueCodec`](super::ValueCodec).
pub trait ValueTransformer: Send + Sync + 'static {
    fn transform(&self, value: Box<dyn Reflect>) -> Box<dyn Reflect>;
}

/// Returns values unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTransformer;

impl ValueTransformer for IdentityTransformer {
    #[inline]
    fn transform(&self, value: Box<dyn Reflect>) -> Box<dyn Reflect> {
        value
    }
}

/// A reference to a document in another collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRef {
    pub collection: String,
    pub id: Bson,
    pub database: Option<String>,
}

dm_reflect::impl_opaque!(DbRef);

impl DbRef {
    /// Reads a `{ "$ref", "$id", "$db" }` document.
    pub fn from_document(document: &Document) -> Option<Self> {
        let collection = document.get_str("$ref").ok()?;
        let id = document.get("$id")?;
        let database = match document.get("$db") {
            None => None,
            Some(Bson::String(database)) => Some(database.clone()),
            Some(_) => return None,
        };
        Some(Self {
            collection: collection.to_owned(),
            id: id.clone(),
            database,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("$ref", self.collection.clone());
        document.insert("$id", self.id.clone());
        if let Some(database) = &self.database {
            document.insert("$db", database.clone());
        }
        document
    }
}

/// Replaces structurally decoded references with [`DbRef`] values.
///
/// Every decoded value passes through the transformer, but only embedded
/// documents shaped as `{ $ref, $id, $db? }` are replaced. A field declared
/// as [`DbRef`] has no codec of its own, so it decodes through the
/// structural fallback and this transformer. Encoding such a field needs a
/// codec registered for [`DbRef`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DbRefTransformer;

impl ValueTransformer for DbRefTransformer {
    fn transform(&self, value: Box<dyn Reflect>) -> Box<dyn Reflect> {
        let reference = value.downcast_ref::<Document>().and_then(DbRef::from_document);
        match reference {
            Some(reference) => Box::new(reference),
            None => value,
        }
    }
}

// -----------------------------------------------------------------------------
// CodecSettings

/// Options shared by every codec of a [`CodecRegistry`](super::CodecRegistry).
///
/// # Examples
///
/// ```
/// use bson::uuid::UuidRepresentation;
/// use dm_codec::codec::{CodecSettings, DbRefTransformer};
///
/// let settings = CodecSettings::default()
///     .with_uuid_representation(UuidRepresentation::JavaLegacy)
///     .with_uuid_as_string(false)
///     .with_transformer(DbRefTransformer);
///
/// assert_eq!(settings.uuid_representation(), UuidRepresentation::JavaLegacy);
/// assert!(!settings.uuid_as_string());
/// ```
#[derive(Clone)]
pub struct CodecSettings {
    uuid_representation: UuidRepresentation,
    uuid_as_string: bool,
    transformer: Arc<dyn ValueTransformer>,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            uuid_representation: UuidRepresentation::Standard,
            uuid_as_string: true,
            transformer: Arc::new(IdentityTransformer),
        }
    }
}

impl CodecSettings {
    /// How binary UUIDs are laid out.
    pub fn with_uuid_representation(mut self, representation: UuidRepresentation) -> Self {
        self.uuid_representation = representation;
        self
    }

    /// Whether typed UUID values are written as strings.
    pub fn with_uuid_as_string(mut self, as_string: bool) -> Self {
        self.uuid_as_string = as_string;
        self
    }

    pub fn with_transformer(mut self, transformer: impl ValueTransformer) -> Self {
        self.transformer = Arc::new(transformer);
        self
    }

    #[inline]
    pub fn uuid_representation(&self) -> UuidRepresentation {
        self.uuid_representation
    }

    #[inline]
    pub fn uuid_as_string(&self) -> bool {
        self.uuid_as_string
    }

    #[inline]
    pub fn transformer(&self) -> &dyn ValueTransformer {
        &*self.transformer
    }
}

impl fmt::Debug for CodecSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecSettings")
            .field("uuid_representation", &self.uuid_representation)
            .field("uuid_as_string", &self.uuid_as_string)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bson::oid::ObjectId;
    use bson::{Bson, doc};
    use dm_reflect::Reflect;

    use super::{DbRef, DbRefTransformer, ValueTransformer};

    #[test]
    fn transforms_references() {
        let id = ObjectId::new();
        let value: Box<dyn Reflect> = Box::new(doc! { "$ref": "users", "$id": id, "$db": "app" });
        let reference = DbRefTransformer.transform(value).take::<DbRef>().unwrap();
        assert_eq!(
            reference,
            DbRef {
                collection: "users".into(),
                id: Bson::ObjectId(id),
                database: Some("app".into()),
            }
        );
        assert_eq!(DbRef::from_document(&reference.to_document()), Some(reference));
    }

    #[test]
    fn leaves_other_values() {
        let value: Box<dyn Reflect> = Box::new(doc! { "$ref": "users" });
        assert!(DbRefTransformer.transform(value).is::<bson::Document>());

        let value: Box<dyn Reflect> = Box::new(String::from("users"));
        assert!(DbRefTransformer.transform(value).is::<String>());
    }
}
