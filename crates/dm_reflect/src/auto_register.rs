//! Collection of `#[docmap(auto_register)]` types through `inventory`.

use crate::info::TypeRef;

pub use inventory;

/// A type submitted by `#[docmap(auto_register)]`.
pub struct AutoRegistration {
    type_ref: fn() -> TypeRef,
}

impl AutoRegistration {
    #[inline]
    pub const fn new(type_ref: fn() -> TypeRef) -> Self {
        Self { type_ref }
    }

    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        (self.type_ref)()
    }
}

inventory::collect!(AutoRegistration);

/// The `TypeRef`s of every auto-registered type linked into the binary.
pub fn registered() -> impl Iterator<Item = TypeRef> {
    inventory::iter::<AutoRegistration>
        .into_iter()
        .map(AutoRegistration::type_ref)
}
