use core::fmt::Write;

use bson::Bson;
use dm_reflect::info::TypePath;
use dm_reflect::{AccessError, Reflect};

use super::CodecRegistry;
use crate::CodecError;

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Root,
    Field(&'a str),
    Index(usize),
}

/// The position of the value being encoded or decoded.
///
/// Composite codecs hand a child context to the codecs of their elements so
/// errors can report where in the document they happened.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use dm_codec::codec::{CodecContext, CodecRegistry};
/// use dm_codec::registry::TypeRegistry;
///
/// let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
/// let root = CodecContext::new(&codecs);
/// let tags = root.child("tags");
///
/// assert_eq!(root.path(), "$");
/// assert_eq!(tags.index(2).path(), "$.tags[2]");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CodecContext<'a> {
    codecs: &'a CodecRegistry,
    parent: Option<&'a CodecContext<'a>>,
    segment: Segment<'a>,
}

impl<'a> CodecContext<'a> {
    /// A context at the document root.
    #[inline]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self {
            codecs,
            parent: None,
            segment: Segment::Root,
        }
    }

    /// The context of field `name` below this one.
    #[inline]
    pub fn child<'b>(&'b self, name: &'b str) -> CodecContext<'b> {
        CodecContext {
            codecs: self.codecs,
            parent: Some(self),
            segment: Segment::Field(name),
        }
    }

    /// The context of element `index` below this one.
    #[inline]
    pub fn index(&self, index: usize) -> CodecContext<'_> {
        CodecContext {
            codecs: self.codecs,
            parent: Some(self),
            segment: Segment::Index(index),
        }
    }

    /// The registry codecs are resolved from.
    #[inline]
    pub fn codecs(&self) -> &'a CodecRegistry {
        self.codecs
    }

    /// The path of this position, e.g. `$.address.city`.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(ctx) = current {
            segments.push(ctx.segment);
            current = ctx.parent;
        }

        let mut path = String::from("$");
        for segment in segments.iter().rev() {
            match segment {
                Segment::Root => {}
                Segment::Field(name) => {
                    path.push('.');
                    path.push_str(name);
                }
                Segment::Index(index) => {
                    let _ = write!(path, "[{index}]");
                }
            }
        }
        path
    }

    pub fn access_error(&self, source: AccessError) -> CodecError {
        CodecError::Access {
            path: self.path(),
            source,
        }
    }

    /// A wire value of the wrong kind.
    pub fn unexpected(&self, expected: &'static str, found: &Bson) -> CodecError {
        CodecError::UnexpectedElement {
            path: self.path(),
            expected,
            found: found.element_type(),
        }
    }

    /// Downcasts a value handed to a codec of `T`.
    pub fn downcast<'v, T: Reflect + TypePath>(&self, value: &'v dyn Reflect) -> Result<&'v T, CodecError> {
        value.downcast_ref::<T>().ok_or_else(|| {
            self.access_error(AccessError::TypeMismatch {
                expected: T::type_path(),
                found: value.reflect_type_path(),
            })
        })
    }
}
