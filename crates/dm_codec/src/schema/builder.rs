use bson::oid::ObjectId;
use dm_reflect::info::{ConstructorDescription, TypeDescription, TypeRef};
use dm_utils::hash::{HashMap, HashSet};

use super::{ConstructorSpec, FieldDescriptor, TypeSchema};
use crate::SchemaError;
use crate::model::ModelNamespace;
use crate::registry::{BuildSession, TypeRegistry};

/// Builds the schema of a mapped type and everything its fields refer to.
///
/// The caller has already checked that `description` is marked. Field types
/// are resolved through `registry`, so types that are being built further up
/// the same session are skipped instead of recursed into.
pub(crate) fn build_type_schema(
    registry: &TypeRegistry,
    session: &mut BuildSession,
    owner: &TypeRef,
    description: &TypeDescription,
    namespace: Option<&ModelNamespace>,
) -> Result<TypeSchema, SchemaError> {
    let ty = owner.path();
    let fields = collect_fields(ty, description)?;
    let constructor = select_constructor(ty, description.constructors(), &fields)?;

    for field in &fields {
        registry.resolve_field(session, field, namespace)?;
    }

    Ok(TypeSchema::new(
        owner.clone(),
        fields,
        constructor,
        description.default_constructor(),
    ))
}

fn collect_fields(
    ty: &'static str,
    description: &TypeDescription,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut names = HashSet::default();
    let mut fields = Vec::with_capacity(description.fields().len());

    for field in description.fields() {
        let field = FieldDescriptor::from_description(field);
        if !names.insert(field.name()) {
            return Err(SchemaError::DuplicateField {
                ty,
                field: field.name(),
            });
        }
        if field.is_id() && !field.declared_type().is::<ObjectId>() {
            return Err(SchemaError::InvalidIdType {
                ty,
                found: field.generic_type().path(),
            });
        }
        fields.push(field);
    }

    Ok(fields)
}

fn select_constructor(
    ty: &'static str,
    constructors: &[ConstructorDescription],
    fields: &[FieldDescriptor],
) -> Result<Option<ConstructorSpec>, SchemaError> {
    let constructor = match constructors {
        [] => return Ok(None),
        [constructor] => constructor,
        _ => {
            return Err(SchemaError::AmbiguousConstructors {
                ty,
                count: constructors.len(),
            });
        }
    };

    let by_name: HashMap<&str, &FieldDescriptor> =
        fields.iter().map(|field| (field.name(), field)).collect();
    let mut required = Vec::with_capacity(constructor.params().len());

    for param in constructor.params() {
        let name = param.field().ok_or(SchemaError::UnboundParameter {
            ty,
            constructor: constructor.name(),
            param: param.ident(),
        })?;
        let field = by_name.get(name).ok_or(SchemaError::UnknownBoundField {
            ty,
            constructor: constructor.name(),
            param: param.ident(),
            field: name,
        })?;
        if required.contains(&name) {
            return Err(SchemaError::DuplicateBinding {
                ty,
                constructor: constructor.name(),
                field: name,
            });
        }
        if param.type_ref() != field.generic_type() {
            return Err(SchemaError::ParameterTypeMismatch {
                ty,
                constructor: constructor.name(),
                param: param.ident(),
                field: name,
                expected: field.generic_type().path(),
                found: param.type_ref().path(),
            });
        }
        required.push(name);
    }

    if constructor.requires_full_coverage() {
        let missing: Vec<_> = fields
            .iter()
            .map(FieldDescriptor::name)
            .filter(|name| !required.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::IncompleteCoverage {
                ty,
                constructor: constructor.name(),
                missing,
            });
        }
    }

    Ok(Some(ConstructorSpec::new(
        constructor.name(),
        constructor.requires_full_coverage(),
        required,
        constructor.invoker(),
    )))
}
