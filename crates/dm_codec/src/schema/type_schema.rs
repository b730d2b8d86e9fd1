use core::fmt;
use std::sync::Arc;

use dm_reflect::info::{Invoker, TypeRef};
use dm_reflect::{AccessError, Reflect};
use dm_utils::hash::HashMap;

use super::FieldDescriptor;
use crate::LookupError;
use crate::model::Collection;

// -----------------------------------------------------------------------------
// ConstructorSpec

/// A validated designated constructor.
///
/// Every required field exists in the owning schema and has the parameter's
/// type. Fields are listed in parameter order.
#[derive(Clone)]
pub struct ConstructorSpec {
    name: &'static str,
    full: bool,
    required: Vec<&'static str>,
    invoke: Invoker,
}

impl ConstructorSpec {
    pub(crate) fn new(name: &'static str, full: bool, required: Vec<&'static str>, invoke: Invoker) -> Self {
        Self {
            name,
            full,
            required,
            invoke,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the constructor covers every mapped field.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Bound field names, in parameter order.
    #[inline]
    pub fn required_fields(&self) -> &[&'static str] {
        &self.required
    }

    /// Parameter position of `field`.
    pub fn position_of(&self, field: &str) -> Option<usize> {
        self.required.iter().position(|name| *name == field)
    }

    /// Calls the constructor with one slot per required field.
    #[inline]
    pub fn invoke(&self, args: Vec<Option<Box<dyn Reflect>>>) -> Result<Box<dyn Reflect>, AccessError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("name", &self.name)
            .field("full", &self.full)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// TypeSchema

/// The structural description of a mapped type.
///
/// Fields keep declaration order. Built once by the
/// [`TypeRegistry`](crate::registry::TypeRegistry) and shared read-only by
/// every codec of the type.
pub struct TypeSchema {
    owner: TypeRef,
    fields: Vec<FieldDescriptor>,
    index: HashMap<&'static str, usize>,
    constructor: Option<ConstructorSpec>,
    default: Option<fn() -> Box<dyn Reflect>>,
}

impl TypeSchema {
    pub(crate) fn new(
        owner: TypeRef,
        fields: Vec<FieldDescriptor>,
        constructor: Option<ConstructorSpec>,
        default: Option<fn() -> Box<dyn Reflect>>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name(), i))
            .collect();
        Self {
            owner,
            fields,
            index,
            constructor,
            default,
        }
    }

    /// The mapped type.
    #[inline]
    pub fn owner(&self) -> &TypeRef {
        &self.owner
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The field stored under `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The designated constructor, if any.
    #[inline]
    pub fn constructor(&self) -> Option<&ConstructorSpec> {
        self.constructor.as_ref()
    }

    /// Fields the designated constructor needs, in parameter order.
    pub fn required_constructor_fields(&self) -> Option<&[&'static str]> {
        self.constructor.as_ref().map(ConstructorSpec::required_fields)
    }

    #[inline]
    pub fn default_constructor(&self) -> Option<fn() -> Box<dyn Reflect>> {
        self.default
    }

    /// Names of the fields flagged unique.
    pub fn unique_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.is_unique())
            .map(FieldDescriptor::name)
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("owner", &self.owner)
            .field("fields", &self.fields.iter().map(FieldDescriptor::name).collect::<Vec<_>>())
            .field("constructor", &self.constructor)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ModelSchema

/// A [`TypeSchema`] stored in a collection of a schema namespace.
pub struct ModelSchema {
    schema: Arc<TypeSchema>,
    model_name: &'static str,
    namespace: String,
    uniques: Vec<&'static str>,
    collection: Arc<dyn Collection>,
}

impl ModelSchema {
    pub(crate) fn new(
        schema: Arc<TypeSchema>,
        model_name: &'static str,
        namespace: String,
        collection: Arc<dyn Collection>,
    ) -> Self {
        let uniques = schema.unique_fields().collect();
        Self {
            schema,
            model_name,
            namespace,
            uniques,
            collection,
        }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    #[inline]
    pub fn owner(&self) -> &TypeRef {
        self.schema.owner()
    }

    #[inline]
    pub fn model_name(&self) -> &'static str {
        self.model_name
    }

    /// Name of the namespace the model was registered in.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn unique_fields(&self) -> &[&'static str] {
        &self.uniques
    }

    #[inline]
    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    /// Name of the unique index of `field`: `<model>_<field>_key`.
    pub fn unique_index_name(&self, field: &str) -> String {
        format!("{}_{}_key", self.model_name, field)
    }

    /// The single unique field, used as a shorthand key.
    pub fn first_unique_field(&self) -> Result<&'static str, LookupError> {
        match self.uniques.as_slice() {
            [field] => Ok(*field),
            [] => Err(LookupError::NoUniqueField {
                model: self.model_name,
            }),
            fields => Err(LookupError::MultipleUniqueFields {
                model: self.model_name,
                fields: fields.to_vec(),
            }),
        }
    }

    /// The non-null value of the field stored under `name`.
    pub fn field_value<'a>(
        &self,
        instance: &'a dyn Reflect,
        name: &str,
    ) -> Result<&'a dyn Reflect, LookupError> {
        let ty = self.owner().path();
        let field = self.schema.field(name).ok_or_else(|| LookupError::UnknownField {
            ty,
            field: name.to_owned(),
        })?;
        field.read(instance)?.ok_or(LookupError::NullField {
            ty,
            field: field.name(),
        })
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("model_name", &self.model_name)
            .field("namespace", &self.namespace)
            .field("uniques", &self.uniques)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
