use core::fmt;

use dm_reflect::info::{EnumDescription, Type};
use dm_reflect::{AccessError, Reflect};
use dm_utils::hash::HashMap;

use crate::SchemaError;

/// The bijection between the variants of a mapped enum and their external
/// values.
///
/// Every variant has exactly one external value and no two variants share
/// one, so encoding never loses information and decoding is unambiguous.
pub struct EnumSchema {
    description: EnumDescription,
    forward: Vec<&'static str>,
    backward: HashMap<&'static str, usize>,
}

impl EnumSchema {
    /// Validates `description`.
    ///
    /// Fails if a variant has no external value or two variants share one.
    pub fn build(description: EnumDescription) -> Result<Self, SchemaError> {
        let ty = description.ty().path();
        let mut forward = Vec::with_capacity(description.variants().len());
        let mut backward: HashMap<&'static str, usize> = HashMap::default();

        for (index, variant) in description.variants().iter().enumerate() {
            let value = variant
                .map_as()
                .ok_or(SchemaError::MissingEnumRepresentation {
                    ty,
                    variant: variant.ident(),
                })?;
            if let Some(&first) = backward.get(value) {
                return Err(SchemaError::DuplicateEnumRepresentation {
                    ty,
                    value,
                    first: description.variants()[first].ident(),
                    second: variant.ident(),
                });
            }
            backward.insert(value, index);
            forward.push(value);
        }

        Ok(Self {
            description,
            forward,
            backward,
        })
    }

    /// The enum type.
    #[inline]
    pub fn ty(&self) -> &Type {
        self.description.ty()
    }

    /// Number of variants.
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// The external value of `value`.
    pub fn external_value(&self, value: &dyn Reflect) -> Result<&'static str, AccessError> {
        let index = self.description.index_of(value)?;
        Ok(self.forward[index])
    }

    /// A fresh instance of the variant mapped to `external`.
    pub fn constant(&self, external: &str) -> Option<Box<dyn Reflect>> {
        let &index = self.backward.get(external)?;
        Some(self.description.variants()[index].value())
    }

    /// `(variant, external value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.description
            .variants()
            .iter()
            .zip(&self.forward)
            .map(|(variant, value)| (variant.ident(), *value))
    }
}

impl fmt::Debug for EnumSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumSchema")
            .field("ty", self.ty())
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::EnumSchema;
    use crate::SchemaError;
    use crate::testing::{Partial, Repeated, Status};
    use dm_reflect::info::MappedEnum;

    #[test]
    fn bijection() {
        let schema = EnumSchema::build(Status::describe_enum()).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.external_value(&Status::Banned).unwrap(), "B");
        let active = schema.constant("A").unwrap();
        assert_eq!(active.downcast_ref::<Status>(), Some(&Status::Active));
        assert!(schema.constant("C").is_none());
        assert_eq!(schema.iter().collect::<Vec<_>>(), [("Active", "A"), ("Banned", "B")]);
    }

    #[test]
    fn wrong_value_type() {
        let schema = EnumSchema::build(Status::describe_enum()).unwrap();
        assert!(schema.external_value(&1_i32).is_err());
    }

    #[test]
    fn missing_representation() {
        let err = EnumSchema::build(Partial::describe_enum()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingEnumRepresentation { variant: "Unmapped", .. }
        ));
    }

    #[test]
    fn duplicate_representation() {
        let err = EnumSchema::build(Repeated::describe_enum()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateEnumRepresentation {
                value: "X",
                first: "One",
                second: "Two",
                ..
            }
        ));
    }
}
