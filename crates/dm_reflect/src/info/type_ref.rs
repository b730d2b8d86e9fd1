use core::any::TypeId;
use core::fmt;

use super::{EnumDescription, ListOps, MapOps, OptionOps, Type, TypeDescription};
use super::{Mapped, MappedEnum, TypePath};
use crate::Reflect;

// -----------------------------------------------------------------------------
// PrimitiveKind

/// Scalar and passthrough types with a direct BSON counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Int64,
    Double,
    String,
    ObjectId,
    DateTime,
    Uuid,
    Binary,
    /// An embedded `bson::Document`, kept as is.
    Document,
    /// Any `bson::Bson` value, kept as is.
    Bson,
}

// -----------------------------------------------------------------------------
// TypeKind

/// How values of a type are turned into documents.
#[derive(Clone, Copy)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// A struct with a [`TypeDescription`].
    Mapped(fn() -> TypeDescription),
    /// A fieldless enum with an [`EnumDescription`].
    Enum(fn() -> EnumDescription),
    /// A sequence; the element type is the single type argument.
    List(ListOps),
    /// A string-keyed map; the value type is the second type argument.
    Map(MapOps),
    /// A nullable value; the inner type is the single type argument.
    Option(OptionOps),
    /// No built-in encoding, a codec must be registered for it.
    Opaque,
}

impl TypeKind {
    /// A short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Primitive(_) => "primitive",
            TypeKind::Mapped(_) => "mapped",
            TypeKind::Enum(_) => "enum",
            TypeKind::List(_) => "list",
            TypeKind::Map(_) => "map",
            TypeKind::Option(_) => "option",
            TypeKind::Opaque => "opaque",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            other => f.write_str(other.label()),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeRef

/// A type as declared on a field or constructor parameter.
///
/// `Simple` types have no type arguments. `Parameterized` types keep their
/// arguments, so `Vec<Foo>` remembers `Foo` and can be resolved without
/// looking at the value.
///
/// Two `TypeRef`s are equal when the owner type and every argument are
/// equal.
///
/// # Examples
///
/// ```
/// use dm_reflect::info::{TypeKind, Typed};
///
/// let tr = <Vec<Option<i32>>>::type_ref();
/// assert!(matches!(tr.kind(), TypeKind::List(_)));
/// assert_eq!(tr.args()[0], <Option<i32>>::type_ref());
/// assert_ne!(tr, <Vec<i32>>::type_ref());
/// ```
#[derive(Clone)]
pub enum TypeRef {
    Simple(Type, TypeKind),
    Parameterized(Type, TypeKind, Vec<TypeRef>),
}

impl TypeRef {
    /// A type without arguments.
    #[inline]
    pub fn simple<T: TypePath>(kind: TypeKind) -> Self {
        TypeRef::Simple(Type::of::<T>(), kind)
    }

    /// A type with arguments.
    #[inline]
    pub fn parameterized<T: TypePath>(kind: TypeKind, args: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized(Type::of::<T>(), kind, args)
    }

    /// The `TypeRef` of a `#[derive(Mapped)]` struct.
    #[inline]
    pub fn mapped<T: Mapped>() -> Self {
        Self::simple::<T>(TypeKind::Mapped(T::describe))
    }

    /// The `TypeRef` of a `#[derive(MappedEnum)]` enum.
    #[inline]
    pub fn enumeration<T: MappedEnum>() -> Self {
        Self::simple::<T>(TypeKind::Enum(T::describe_enum))
    }

    /// The `TypeRef` of a type that needs a registered codec.
    #[inline]
    pub fn opaque<T: TypePath>() -> Self {
        Self::simple::<T>(TypeKind::Opaque)
    }

    /// The owner type, without arguments.
    #[inline]
    pub fn ty(&self) -> &Type {
        match self {
            TypeRef::Simple(ty, _) | TypeRef::Parameterized(ty, _, _) => ty,
        }
    }

    /// The encoding kind.
    #[inline]
    pub fn kind(&self) -> &TypeKind {
        match self {
            TypeRef::Simple(_, kind) | TypeRef::Parameterized(_, kind, _) => kind,
        }
    }

    /// The type arguments, empty for `Simple`.
    #[inline]
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Simple(..) => &[],
            TypeRef::Parameterized(_, _, args) => args,
        }
    }

    /// The `TypeId` of the full type, arguments included.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.ty().id()
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn path(&self) -> &'static str {
        self.ty().path()
    }

    /// Returns `true` for the `Parameterized` variant.
    #[inline]
    pub fn is_parameterized(&self) -> bool {
        matches!(self, TypeRef::Parameterized(..))
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty().is::<T>()
    }

    /// For `Option<T>`, the `TypeRef` of `T`. Otherwise `self`.
    pub fn unwrap_option(&self) -> &TypeRef {
        match (self.kind(), self.args()) {
            (TypeKind::Option(_), [inner]) => inner,
            _ => self,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ty() == other.ty() && self.args() == other.args()
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// -----------------------------------------------------------------------------
// Typed

/// Produces the [`TypeRef`] of `Self`.
///
/// Implemented by the derives, by [`impl_opaque!`](crate::impl_opaque) and
/// for the primitive and container types in [`impls`](crate::impls).
pub trait Typed: Reflect + TypePath + Sized {
    fn type_ref() -> TypeRef;
}
