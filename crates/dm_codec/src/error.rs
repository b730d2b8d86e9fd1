use bson::spec::ElementType;
use dm_reflect::AccessError;
use thiserror::Error;

use crate::model::StorageError;
use crate::registry::EntryKind;

/// A malformed schema, reported while building it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("`{ty}` is not marked as a mapped type")]
    NotMapped { ty: &'static str },
    #[error("`{ty}` has no model name")]
    MissingModelName { ty: &'static str },
    #[error("`{ty}` is not a mapped enum")]
    NotAnEnum { ty: &'static str },
    #[error("field `_id` of `{ty}` must be an `ObjectId`, found `{found}`")]
    InvalidIdType {
        ty: &'static str,
        found: &'static str,
    },
    #[error("`{ty}` maps more than one field to `{field}`")]
    DuplicateField {
        ty: &'static str,
        field: &'static str,
    },
    #[error("variant `{variant}` of `{ty}` has no external representation")]
    MissingEnumRepresentation {
        ty: &'static str,
        variant: &'static str,
    },
    #[error("variants `{first}` and `{second}` of `{ty}` both map to `{value}`")]
    DuplicateEnumRepresentation {
        ty: &'static str,
        value: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("`{ty}` declares {count} designated constructors, expected at most one")]
    AmbiguousConstructors { ty: &'static str, count: usize },
    #[error("parameter `{param}` of `{ty}::{constructor}` is not bound to a field")]
    UnboundParameter {
        ty: &'static str,
        constructor: &'static str,
        param: &'static str,
    },
    #[error("parameter `{param}` of `{ty}::{constructor}` is bound to unknown field `{field}`")]
    UnknownBoundField {
        ty: &'static str,
        constructor: &'static str,
        param: &'static str,
        field: &'static str,
    },
    #[error("field `{field}` is bound twice by `{ty}::{constructor}`")]
    DuplicateBinding {
        ty: &'static str,
        constructor: &'static str,
        field: &'static str,
    },
    #[error(
        "parameter `{param}` of `{ty}::{constructor}` is `{found}`, but field `{field}` is `{expected}`"
    )]
    ParameterTypeMismatch {
        ty: &'static str,
        constructor: &'static str,
        param: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{ty}::{constructor}` must cover every field, missing {missing:?}")]
    IncompleteCoverage {
        ty: &'static str,
        constructor: &'static str,
        missing: Vec<&'static str>,
    },
    #[error("`{ty}` is already bound to namespace `{namespace}`")]
    ModelRebound { ty: &'static str, namespace: String },
    #[error("schema namespace `{name}` is already registered")]
    DuplicateNamespace { name: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A failed lookup of something that should have been registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupError {
    #[error("no model found for `{ty}`")]
    ModelNotRegistered { ty: &'static str },
    #[error("`{ty}` is not registered")]
    NotRegistered { ty: &'static str },
    #[error("`{ty}` is registered as a {found}, not as a {expected}")]
    EntryMismatch {
        ty: &'static str,
        expected: EntryKind,
        found: EntryKind,
    },
    #[error("model `{model}` has no unique field")]
    NoUniqueField { model: &'static str },
    #[error("model `{model}` has more than one unique field: {fields:?}")]
    MultipleUniqueFields {
        model: &'static str,
        fields: Vec<&'static str>,
    },
    #[error("`{ty}` has no field `{field}`")]
    UnknownField { ty: &'static str, field: String },
    #[error("field `{field}` of `{ty}` is null")]
    NullField { ty: &'static str, field: &'static str },
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// A failure while encoding or decoding one value.
///
/// `path` locates the value inside the document, e.g. `$.address.city` or
/// `$.tags[2]`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("no codec found for `{ty}`")]
    NoCodec { ty: &'static str },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("at `{path}`: {source}")]
    Access {
        path: String,
        #[source]
        source: AccessError,
    },
    #[error("at `{path}`: expected {expected}, found {found:?}")]
    UnexpectedElement {
        path: String,
        expected: &'static str,
        found: ElementType,
    },
    #[error("at `{path}`: {value} does not fit in `{ty}`")]
    OutOfRange {
        path: String,
        ty: &'static str,
        value: String,
    },
    #[error("at `{path}`: `{value}` is not a value of `{ty}`")]
    UnknownEnumValue {
        path: String,
        ty: &'static str,
        value: String,
    },
    #[error("`{ty}` has neither a designated nor a no-argument constructor")]
    NoDefaultConstructor { ty: &'static str },
    #[error("at `{path}`: null is not allowed for `{ty}`")]
    NullNotAllowed { path: String, ty: &'static str },
    #[error("at `{path}`: invalid uuid: {message}")]
    InvalidUuid { path: String, message: String },
    #[error("at `{path}`: {message}")]
    Serde { path: String, message: String },
}
