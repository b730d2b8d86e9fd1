use thiserror::Error;

/// A failure while reading or writing a value through erased metadata.
///
/// Raised by generated field accessors, constructor invokers and container
/// operations when a `dyn Reflect` does not hold the expected type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value of type `{found}` is not assignable to `{field}: {expected}`")]
    NotAssignable {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no value supplied for constructor parameter bound to `{field}`")]
    MissingArgument { field: &'static str },
}
