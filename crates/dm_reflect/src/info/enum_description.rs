use core::fmt;

use super::{Type, Typed};
use crate::{AccessError, Reflect};

/// One variant of a fieldless enum.
#[derive(Clone, Copy)]
pub struct VariantDescription {
    ident: &'static str,
    map_as: Option<&'static str>,
    value: fn() -> Box<dyn Reflect>,
}

impl VariantDescription {
    pub const fn new(
        ident: &'static str,
        map_as: Option<&'static str>,
        value: fn() -> Box<dyn Reflect>,
    ) -> Self {
        Self {
            ident,
            map_as,
            value,
        }
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// The external representation, if the variant carries one.
    #[inline]
    pub fn map_as(&self) -> Option<&'static str> {
        self.map_as
    }

    /// A fresh boxed instance of the variant.
    #[inline]
    pub fn value(&self) -> Box<dyn Reflect> {
        (self.value)()
    }
}

impl fmt::Debug for VariantDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescription")
            .field("ident", &self.ident)
            .field("map_as", &self.map_as)
            .finish_non_exhaustive()
    }
}

/// Raw metadata of a fieldless enum, as emitted by `#[derive(MappedEnum)]`.
#[derive(Debug, Clone)]
pub struct EnumDescription {
    ty: Type,
    variants: Vec<VariantDescription>,
    index_of: fn(&dyn Reflect) -> Result<usize, AccessError>,
}

impl EnumDescription {
    /// `index_of` maps a value of `T` to its position in `variants`.
    pub fn new<T: Typed>(
        variants: Vec<VariantDescription>,
        index_of: fn(&dyn Reflect) -> Result<usize, AccessError>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            variants,
            index_of,
        }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Variants in declaration order.
    #[inline]
    pub fn variants(&self) -> &[VariantDescription] {
        &self.variants
    }

    /// Position of `value` in [`variants`](Self::variants).
    #[inline]
    pub fn index_of(&self, value: &dyn Reflect) -> Result<usize, AccessError> {
        (self.index_of)(value)
    }
}
