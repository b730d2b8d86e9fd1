use bson::{Bson, Document};
use dm_reflect::Reflect;
use dm_reflect::info::{ListOps, MapOps, OptionOps, Type, TypeRef};

use super::{Codec, CodecContext, ValueCodec};
use crate::CodecError;

// -----------------------------------------------------------------------------
// ListCodec

/// Codec of `Vec<T>`, as a BSON array.
#[derive(Debug, Clone)]
pub struct ListCodec {
    ty: Type,
    ops: ListOps,
    item: TypeRef,
}

impl ListCodec {
    #[inline]
    pub fn new(ty: Type, ops: ListOps, item: TypeRef) -> Self {
        Self { ty, ops, item }
    }
}

impl Codec for ListCodec {
    #[inline]
    fn target(&self) -> Type {
        self.ty
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        let items = self.ops.items(value).map_err(|err| ctx.access_error(err))?;
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| ValueCodec::write_value(item, &self.item, &ctx.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Bson::Array)
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        let Bson::Array(array) = value else {
            return Err(ctx.unexpected("an array", value));
        };
        let mut list = self.ops.with_capacity(array.len());
        for (i, element) in array.iter().enumerate() {
            let ctx = ctx.index(i);
            let item = ValueCodec::read_into(element, &self.item, &ctx)?;
            self.ops
                .push(&mut *list, item)
                .map_err(|err| ctx.access_error(err))?;
        }
        Ok(list)
    }
}

// -----------------------------------------------------------------------------
// MapCodec

/// Codec of string-keyed maps, as an embedded document.
#[derive(Debug, Clone)]
pub struct MapCodec {
    ty: Type,
    ops: MapOps,
    value: TypeRef,
}

impl MapCodec {
    #[inline]
    pub fn new(ty: Type, ops: MapOps, value: TypeRef) -> Self {
        Self { ty, ops, value }
    }
}

impl Codec for MapCodec {
    #[inline]
    fn target(&self) -> Type {
        self.ty
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        let entries = self.ops.entries(value).map_err(|err| ctx.access_error(err))?;
        let mut document = Document::new();
        for (key, entry) in entries {
            let encoded = ValueCodec::write_value(entry, &self.value, &ctx.child(key))?;
            document.insert(key, encoded);
        }
        Ok(Bson::Document(document))
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        let Bson::Document(document) = value else {
            return Err(ctx.unexpected("a document", value));
        };
        let mut map = self.ops.new_map();
        for (key, entry) in document {
            let ctx = ctx.child(key);
            let decoded = ValueCodec::read_into(entry, &self.value, &ctx)?;
            self.ops
                .insert(&mut *map, key.clone(), decoded)
                .map_err(|err| ctx.access_error(err))?;
        }
        Ok(map)
    }
}

// -----------------------------------------------------------------------------
// OptionCodec

/// Codec of `Option<T>`, with `None` as null.
#[derive(Debug, Clone)]
pub struct OptionCodec {
    ty: Type,
    ops: OptionOps,
    inner: TypeRef,
}

impl OptionCodec {
    #[inline]
    pub fn new(ty: Type, ops: OptionOps, inner: TypeRef) -> Self {
        Self { ty, ops, inner }
    }
}

impl Codec for OptionCodec {
    #[inline]
    fn target(&self) -> Type {
        self.ty
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        match self.ops.get(value).map_err(|err| ctx.access_error(err))? {
            Some(inner) => ValueCodec::write_value(inner, &self.inner, ctx),
            None => Ok(Bson::Null),
        }
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match ValueCodec::read_value(value, Some(&self.inner), ctx)? {
            Some(inner) => self.ops.some(inner).map_err(|err| ctx.access_error(err)),
            None => Ok(self.ops.none()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use bson::{Bson, bson, doc};
    use dm_reflect::info::Typed;

    use crate::CodecError;
    use crate::codec::{CodecContext, CodecRegistry, ValueCodec};
    use crate::registry::TypeRegistry;
    use crate::testing::Status;

    #[test]
    fn nested_lists() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let ctx = CodecContext::new(&codecs);
        let ty = <Vec<Vec<Status>>>::type_ref();
        let value = vec![vec![Status::Active], vec![], vec![Status::Banned, Status::Active]];

        let encoded = ValueCodec::write_value(&value, &ty, &ctx).unwrap();
        assert_eq!(encoded, bson!([["A"], [], ["B", "A"]]));
        let decoded = ValueCodec::read_into(&encoded, &ty, &ctx).unwrap();
        assert_eq!(decoded.take::<Vec<Vec<Status>>>().ok(), Some(value));
    }

    #[test]
    fn list_errors_carry_index() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let ctx = CodecContext::new(&codecs);
        let tags = ctx.child("tags");
        let err = ValueCodec::read_into(&bson!(["a", 1]), &<Vec<String>>::type_ref(), &tags).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedElement { ref path, .. } if path == "$.tags[1]"));

        let err = ValueCodec::read_into(&bson!(["a", null]), &<Vec<String>>::type_ref(), &tags).unwrap_err();
        assert!(matches!(err, CodecError::NullNotAllowed { ref path, .. } if path == "$.tags[1]"));
    }

    #[test]
    fn optional_items() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let ctx = CodecContext::new(&codecs);
        let ty = <Vec<Option<i64>>>::type_ref();
        let value = vec![Some(1_i64), None];

        let encoded = ValueCodec::write_value(&value, &ty, &ctx).unwrap();
        assert_eq!(encoded, bson!([1_i64, null]));
        let decoded = ValueCodec::read_into(&encoded, &ty, &ctx).unwrap();
        assert_eq!(decoded.take::<Vec<Option<i64>>>().ok(), Some(value));
    }

    #[test]
    fn string_keyed_maps() {
        let codecs = CodecRegistry::new(Arc::new(TypeRegistry::new()));
        let ctx = CodecContext::new(&codecs);
        let ty = <BTreeMap<String, i32>>::type_ref();
        let value = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);

        let encoded = ValueCodec::write_value(&value, &ty, &ctx).unwrap();
        assert_eq!(encoded, Bson::Document(doc! { "a": 1, "b": 2 }));
        let decoded = ValueCodec::read_into(&encoded, &ty, &ctx).unwrap();
        assert_eq!(decoded.take::<BTreeMap<String, i32>>().ok(), Some(value));

        let err = ValueCodec::read_into(&Bson::Document(doc! { "a": "x" }), &ty, &ctx).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedElement { ref path, .. } if path == "$.a"));
    }
}
