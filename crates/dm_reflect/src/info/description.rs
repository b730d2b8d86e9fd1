use core::fmt;

use super::{Type, TypeRef, Typed};
use crate::{AccessError, Reflect};

// -----------------------------------------------------------------------------
// MappingMarker

/// The type-level marker of a described struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMarker {
    /// Not marked; schema builders skip the type.
    Unmapped,
    /// A plain mapped type, embedded in other documents.
    Type,
    /// A model stored in the named collection. The name may be empty, which
    /// schema builders report.
    Model(&'static str),
}

// -----------------------------------------------------------------------------
// FieldAccessor

/// Reads and writes one field of an erased owner.
///
/// `get` returns the field as declared, so an `Option<T>` field yields the
/// `Option<T>` itself. `set` expects a value of the declared type.
#[derive(Clone, Copy)]
pub struct FieldAccessor {
    get: fn(&dyn Reflect) -> Result<&dyn Reflect, AccessError>,
    set: fn(&mut dyn Reflect, Box<dyn Reflect>) -> Result<(), AccessError>,
}

impl FieldAccessor {
    #[inline]
    pub const fn new(
        get: fn(&dyn Reflect) -> Result<&dyn Reflect, AccessError>,
        set: fn(&mut dyn Reflect, Box<dyn Reflect>) -> Result<(), AccessError>,
    ) -> Self {
        Self { get, set }
    }

    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Reflect) -> Result<&'a dyn Reflect, AccessError> {
        (self.get)(owner)
    }

    #[inline]
    pub fn set(&self, owner: &mut dyn Reflect, value: Box<dyn Reflect>) -> Result<(), AccessError> {
        (self.set)(owner, value)
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldAccessor")
    }
}

// -----------------------------------------------------------------------------
// FieldDescription

/// Raw metadata of one marked field.
#[derive(Debug, Clone)]
pub struct FieldDescription {
    ident: &'static str,
    name: &'static str,
    ty: TypeRef,
    unique: bool,
    use_default: bool,
    accessor: FieldAccessor,
}

impl FieldDescription {
    /// A field named `ident` in Rust and `name` in documents.
    pub fn new(ident: &'static str, name: &'static str, ty: TypeRef, accessor: FieldAccessor) -> Self {
        Self {
            ident,
            name,
            ty,
            unique: false,
            use_default: false,
            accessor,
        }
    }

    /// Flags the field as unique within its model's collection.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Keeps the constructed default when a document supplies `null`.
    pub fn use_default(mut self) -> Self {
        self.use_default = true;
        self
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type, generic arguments included.
    #[inline]
    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    #[inline]
    pub fn is_use_default(&self) -> bool {
        self.use_default
    }

    #[inline]
    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }
}

// -----------------------------------------------------------------------------
// ConstructorDescription

/// One constructor parameter.
#[derive(Debug, Clone)]
pub struct ParamDescription {
    ident: &'static str,
    field: Option<&'static str>,
    ty: TypeRef,
}

impl ParamDescription {
    /// A parameter bound to the document field `field`.
    pub fn bound<T: Typed>(ident: &'static str, field: &'static str) -> Self {
        Self {
            ident,
            field: Some(field),
            ty: T::type_ref(),
        }
    }

    /// A parameter without a field binding, rejected by schema builders.
    pub fn unbound<T: Typed>(ident: &'static str) -> Self {
        Self {
            ident,
            field: None,
            ty: T::type_ref(),
        }
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// The external field name this parameter is bound to.
    #[inline]
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    #[inline]
    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }
}

/// Calls a constructor with one slot per parameter, `None` for absent values.
pub type Invoker = fn(Vec<Option<Box<dyn Reflect>>>) -> Result<Box<dyn Reflect>, AccessError>;

/// A designated constructor, emitted by `#[constructors]`.
#[derive(Clone)]
pub struct ConstructorDescription {
    name: &'static str,
    full: bool,
    params: Vec<ParamDescription>,
    invoke: Invoker,
}

impl ConstructorDescription {
    pub fn new(name: &'static str, params: Vec<ParamDescription>, invoke: Invoker) -> Self {
        Self {
            name,
            full: false,
            params,
            invoke,
        }
    }

    /// Requires the parameters to cover every mapped field.
    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn requires_full_coverage(&self) -> bool {
        self.full
    }

    #[inline]
    pub fn params(&self) -> &[ParamDescription] {
        &self.params
    }

    #[inline]
    pub fn invoker(&self) -> Invoker {
        self.invoke
    }
}

impl fmt::Debug for ConstructorDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescription")
            .field("name", &self.name)
            .field("full", &self.full)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// TypeDescription

/// Raw metadata of a struct, as emitted by `#[derive(Mapped)]`.
///
/// Nothing is validated here. Schema builders check model names, the `_id`
/// type, constructor bindings and coverage.
///
/// # Examples
///
/// Descriptions can also be written by hand:
///
/// ```
/// use dm_reflect::info::{
///     FieldAccessor, FieldDescription, MappingMarker, TypeDescription, Typed,
/// };
/// use dm_reflect::__macro_exports::{assign, owner_mut, owner_ref};
/// use dm_reflect::{Reflect, impl_opaque};
///
/// #[derive(Default)]
/// struct Tag {
///     label: String,
/// }
/// impl_opaque!(Tag);
///
/// let desc = TypeDescription::new::<Tag>()
///     .model("tags")
///     .with_default::<Tag>()
///     .with_field(FieldDescription::new(
///         "label",
///         "label",
///         String::type_ref(),
///         FieldAccessor::new(
///             |o| Ok(&owner_ref::<Tag>(o)?.label as &dyn Reflect),
///             |o, v| {
///                 owner_mut::<Tag>(o)?.label = assign::<String>(v, "label")?;
///                 Ok(())
///             },
///         ),
///     ).unique());
///
/// assert_eq!(desc.marker(), MappingMarker::Model("tags"));
/// assert!(desc.default_constructor().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TypeDescription {
    ty: Type,
    marker: MappingMarker,
    fields: Vec<FieldDescription>,
    constructors: Vec<ConstructorDescription>,
    default: Option<fn() -> Box<dyn Reflect>>,
}

impl TypeDescription {
    /// An unmapped description of `T` with no fields.
    pub fn new<T: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            marker: MappingMarker::Unmapped,
            fields: Vec::new(),
            constructors: Vec::new(),
            default: None,
        }
    }

    /// Marks the type as a plain mapped type.
    pub fn mapped(mut self) -> Self {
        if self.marker == MappingMarker::Unmapped {
            self.marker = MappingMarker::Type;
        }
        self
    }

    /// Marks the type as a model stored in `name`.
    pub fn model(mut self, name: &'static str) -> Self {
        self.marker = MappingMarker::Model(name);
        self
    }

    pub fn with_field(mut self, field: FieldDescription) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorDescription) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_constructors(mut self, constructors: Vec<ConstructorDescription>) -> Self {
        self.constructors.extend(constructors);
        self
    }

    /// Uses `T::default()` as the no-argument constructor.
    pub fn with_default<T: Default + Reflect>(self) -> Self {
        self.with_factory(|| Box::new(T::default()))
    }

    /// Uses `factory` as the no-argument constructor.
    pub fn with_factory(mut self, factory: fn() -> Box<dyn Reflect>) -> Self {
        self.default = Some(factory);
        self
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn marker(&self) -> MappingMarker {
        self.marker
    }

    /// Returns `true` for plain types and models.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.marker != MappingMarker::Unmapped
    }

    /// The model name, if marked as a model.
    #[inline]
    pub fn model_name(&self) -> Option<&'static str> {
        match self.marker {
            MappingMarker::Model(name) => Some(name),
            _ => None,
        }
    }

    /// Marked fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDescription] {
        &self.fields
    }

    /// Designated constructors.
    #[inline]
    pub fn constructors(&self) -> &[ConstructorDescription] {
        &self.constructors
    }

    #[inline]
    pub fn default_constructor(&self) -> Option<fn() -> Box<dyn Reflect>> {
        self.default
    }
}
