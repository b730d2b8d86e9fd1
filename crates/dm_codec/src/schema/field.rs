use dm_reflect::info::{FieldAccessor, FieldDescription, TypeKind, TypeRef};
use dm_reflect::{AccessError, Reflect};

/// The reserved primary-key field name.
pub const ID_FIELD: &str = "_id";

/// Immutable metadata of one mapped field.
///
/// The generic type is the type as declared, e.g. `Option<Vec<Tag>>`. The
/// declared type strips one level of `Option`, since null handling happens
/// before a codec is involved.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    ident: &'static str,
    generic_type: TypeRef,
    unique: bool,
    use_default: bool,
    accessor: FieldAccessor,
}

impl FieldDescriptor {
    pub(crate) fn from_description(description: &FieldDescription) -> Self {
        Self {
            name: description.name(),
            ident: description.ident(),
            generic_type: description.type_ref().clone(),
            unique: description.is_unique(),
            use_default: description.is_use_default(),
            accessor: *description.accessor(),
        }
    }

    /// External name in documents.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust field name.
    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// The full declared type.
    #[inline]
    pub fn generic_type(&self) -> &TypeRef {
        &self.generic_type
    }

    /// The declared type with `Option` stripped.
    #[inline]
    pub fn declared_type(&self) -> &TypeRef {
        self.generic_type.unwrap_option()
    }

    /// Type arguments of [`declared_type`](Self::declared_type).
    #[inline]
    pub fn generic_args(&self) -> &[TypeRef] {
        self.declared_type().args()
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// A `null` in the document keeps the constructed default.
    #[inline]
    pub fn use_fallback_on_null(&self) -> bool {
        self.use_default
    }

    /// Returns `true` if the field is an `Option`.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self.generic_type.kind(), TypeKind::Option(_))
    }

    /// Returns `true` for the `_id` field.
    #[inline]
    pub fn is_id(&self) -> bool {
        self.name == ID_FIELD
    }

    /// Reads the field, `None` when an optional field is empty.
    pub fn read<'a>(&self, owner: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, AccessError> {
        let value = self.accessor.get(owner)?;
        match self.generic_type.kind() {
            TypeKind::Option(ops) => ops.get(value),
            _ => Ok(Some(value)),
        }
    }

    /// Writes a value of the declared type, `None` only for optional fields.
    pub fn write(&self, owner: &mut dyn Reflect, value: Option<Box<dyn Reflect>>) -> Result<(), AccessError> {
        match self.lift(value)? {
            Some(value) => self.accessor.set(owner, value),
            None => Err(AccessError::MissingArgument { field: self.name }),
        }
    }

    /// Wraps a declared-type value into the generic type.
    ///
    /// Optional fields turn `None` into a boxed `None` and values into
    /// `Some`. Other fields pass the value through.
    pub(crate) fn lift(
        &self,
        value: Option<Box<dyn Reflect>>,
    ) -> Result<Option<Box<dyn Reflect>>, AccessError> {
        match (self.generic_type.kind(), value) {
            (TypeKind::Option(ops), Some(value)) => ops.some(value).map(Some),
            (TypeKind::Option(ops), None) => Ok(Some(ops.none())),
            (_, value) => Ok(value),
        }
    }
}
