use super::{ConstructorDescription, EnumDescription, TypeDescription, Typed};

/// A struct with a [`TypeDescription`].
///
/// Usually derived with [`#[derive(Mapped)]`](crate::derive::Mapped).
pub trait Mapped: Typed {
    fn describe() -> TypeDescription;
}

/// A fieldless enum with an [`EnumDescription`].
///
/// Usually derived with [`#[derive(MappedEnum)]`](crate::derive::MappedEnum).
pub trait MappedEnum: Typed {
    fn describe_enum() -> EnumDescription;
}

/// Designated constructors of a type.
///
/// Implemented by [`#[constructors]`](crate::derive::constructors) on an
/// inherent impl block, and picked up by `#[docmap(constructors)]`.
pub trait MappedConstructors: Typed {
    fn constructors() -> Vec<ConstructorDescription>;
}
