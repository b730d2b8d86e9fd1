//! Items used by generated code. Not public API.

use crate::info::{TypeKind, TypePath, Typed};
use crate::{AccessError, Reflect};

#[cfg(feature = "auto_register")]
pub use crate::auto_register;

/// Downcasts an erased owner, reporting both type paths on a mismatch.
#[inline]
pub fn owner_ref<O: Reflect + TypePath>(owner: &dyn Reflect) -> Result<&O, AccessError> {
    owner.downcast_ref::<O>().ok_or(AccessError::TypeMismatch {
        expected: O::type_path(),
        found: owner.reflect_type_path(),
    })
}

/// Mutable version of [`owner_ref`].
#[inline]
pub fn owner_mut<O: Reflect + TypePath>(owner: &mut dyn Reflect) -> Result<&mut O, AccessError> {
    let found = owner.reflect_type_path();
    owner.downcast_mut::<O>().ok_or(AccessError::TypeMismatch {
        expected: O::type_path(),
        found,
    })
}

/// Unboxes a value about to be stored in `field`.
#[inline]
pub fn assign<F: Reflect + TypePath>(value: Box<dyn Reflect>, field: &'static str) -> Result<F, AccessError> {
    value.take::<F>().map_err(|value| AccessError::NotAssignable {
        field,
        expected: F::type_path(),
        found: value.reflect_type_path(),
    })
}

/// Unboxes a constructor argument bound to `field`.
///
/// An absent argument becomes `None` when the parameter is an `Option`.
pub fn argument<P: Typed>(slot: Option<Box<dyn Reflect>>, field: &'static str) -> Result<P, AccessError> {
    let value = match slot {
        Some(value) => value,
        None => match P::type_ref().kind() {
            TypeKind::Option(ops) => ops.none(),
            _ => return Err(AccessError::MissingArgument { field }),
        },
    };
    assign::<P>(value, field)
}

#[cfg(test)]
mod tests {
    use super::{argument, assign};
    use crate::AccessError;

    #[test]
    fn missing_optional_argument_is_none() {
        assert_eq!(argument::<Option<i32>>(None, "age").unwrap(), None);
        assert_eq!(
            argument::<i32>(None, "age").unwrap_err(),
            AccessError::MissingArgument { field: "age" }
        );
    }

    #[test]
    fn assign_reports_paths() {
        let err = assign::<i64>(Box::new(String::new()), "count").unwrap_err();
        assert_eq!(
            err,
            AccessError::NotAssignable {
                field: "count",
                expected: "i64",
                found: "alloc::string::String",
            }
        );
    }
}
