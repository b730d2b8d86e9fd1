use bson::oid::ObjectId;
use bson::{Binary, Bson, DateTime, Document, Uuid};

use crate::info::{PrimitiveKind, TypeKind, TypePath, TypeRef, Typed};

macro_rules! impl_primitive {
    ($ty:ty, $path:literal, $name:literal => $kind:ident) => {
        impl TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }

        impl Typed for $ty {
            #[inline]
            fn type_ref() -> TypeRef {
                TypeRef::simple::<Self>(TypeKind::Primitive(PrimitiveKind::$kind))
            }
        }
    };
}

impl_primitive!(bool, "bool", "bool" => Bool);
impl_primitive!(i32, "i32", "i32" => Int32);
impl_primitive!(i64, "i64", "i64" => Int64);
impl_primitive!(f64, "f64", "f64" => Double);
impl_primitive!(String, "alloc::string::String", "String" => String);
impl_primitive!(ObjectId, "bson::oid::ObjectId", "ObjectId" => ObjectId);
impl_primitive!(DateTime, "bson::DateTime", "DateTime" => DateTime);
impl_primitive!(Uuid, "bson::Uuid", "Uuid" => Uuid);
impl_primitive!(Binary, "bson::Binary", "Binary" => Binary);
impl_primitive!(Document, "bson::Document", "Document" => Document);
impl_primitive!(Bson, "bson::Bson", "Bson" => Bson);
