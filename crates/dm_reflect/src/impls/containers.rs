use std::collections::{BTreeMap, HashMap};

use crate::info::{ListOps, MapOps, OptionOps, TypeKind, TypePath, TypeRef, Typed};

impl<T: Typed> TypePath for Vec<T> {}

impl<T: Typed> Typed for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::parameterized::<Self>(TypeKind::List(ListOps::vec::<T>()), vec![T::type_ref()])
    }
}

impl<T: Typed> TypePath for Option<T> {}

impl<T: Typed> Typed for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::parameterized::<Self>(TypeKind::Option(OptionOps::of::<T>()), vec![T::type_ref()])
    }
}

impl<V: Typed> TypePath for HashMap<String, V> {}

impl<V: Typed> Typed for HashMap<String, V> {
    fn type_ref() -> TypeRef {
        TypeRef::parameterized::<Self>(
            TypeKind::Map(MapOps::hash_map::<V>()),
            vec![String::type_ref(), V::type_ref()],
        )
    }
}

impl<V: Typed> TypePath for BTreeMap<String, V> {}

impl<V: Typed> Typed for BTreeMap<String, V> {
    fn type_ref() -> TypeRef {
        TypeRef::parameterized::<Self>(
            TypeKind::Map(MapOps::btree_map::<V>()),
            vec![String::type_ref(), V::type_ref()],
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::Reflect;
    use crate::info::{TypeKind, Typed};
    use std::collections::BTreeMap;

    #[test]
    fn option_unwraps_to_inner() {
        let tr = <Option<Vec<i32>>>::type_ref();
        assert_eq!(tr.unwrap_option(), &<Vec<i32>>::type_ref());
        assert_eq!(i32::type_ref().unwrap_option(), &i32::type_ref());
    }

    #[test]
    fn map_ops_round_trip_entries() {
        let tr = <BTreeMap<String, i64>>::type_ref();
        let TypeKind::Map(ops) = tr.kind() else {
            panic!("expected a map kind");
        };
        let mut map = ops.new_map();
        ops.insert(map.as_mut(), "b".into(), Box::new(2_i64)).unwrap();
        ops.insert(map.as_mut(), "a".into(), Box::new(1_i64)).unwrap();
        let keys: Vec<_> = ops.entries(map.as_ref()).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        let wrong: Box<dyn Reflect> = Box::new(1_i32);
        assert!(ops.insert(map.as_mut(), "c".into(), wrong).is_err());
    }
}
