use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// - [`type_path`](TypePath::type_path): full path, unique per type.
/// - [`type_name`](TypePath::type_name): name without module path.
///
/// Neither carries a leading `::`.
///
/// The default implementations fall back to [`core::any::type_name`], which
/// is what generic containers use. Derived and primitive implementations
/// return stable literals.
///
/// # Examples
///
/// ```
/// use dm_reflect::info::TypePath;
///
/// struct Foo;
///
/// impl TypePath for Foo {
///     fn type_path() -> &'static str { "my_crate::Foo" }
///     fn type_name() -> &'static str { "Foo" }
/// }
///
/// assert_eq!(Foo::type_name(), "Foo");
/// ```
pub trait TypePath: 'static {
    /// Full path of the type.
    fn type_path() -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Name of the type without the module path.
    fn type_name() -> &'static str {
        Self::type_path()
    }
}

// -----------------------------------------------------------------------------
// Type

/// A [`TypeId`] with the [`TypePath`] functions of the same type.
///
/// Equality and hashing only look at the `TypeId`.
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: fn() -> &'static str,
    name: fn() -> &'static str,
}

impl Type {
    /// Creates the `Type` of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dm_reflect::info::Type;
    ///
    /// let ty = Type::of::<i64>();
    /// assert!(ty.is::<i64>());
    /// assert_eq!(ty.path(), "i64");
    /// ```
    #[inline]
    pub fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: T::type_path,
            name: T::type_name,
        }
    }

    /// The `TypeId`.
    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn path(&self) -> &'static str {
        (self.path)()
    }

    /// See [`TypePath::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        (self.name)()
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
