use core::fmt;

use crate::__macro_exports::{owner_mut, owner_ref, assign};
use crate::{AccessError, Reflect};

use super::Typed;

// -----------------------------------------------------------------------------
// ListOps

/// Erased operations of a sequence type such as `Vec<T>`.
///
/// # Examples
///
/// ```
/// use dm_reflect::Reflect;
/// use dm_reflect::info::ListOps;
///
/// let ops = ListOps::vec::<i32>();
/// let mut list = ops.with_capacity(2);
/// ops.push(list.as_mut(), Box::new(4_i32)).unwrap();
/// assert_eq!(ops.items(list.as_ref()).unwrap().len(), 1);
/// assert!(ops.push(list.as_mut(), Box::new("x".to_string())).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct ListOps {
    with_capacity: fn(usize) -> Box<dyn Reflect>,
    push: fn(&mut dyn Reflect, Box<dyn Reflect>) -> Result<(), AccessError>,
    items: fn(&dyn Reflect) -> Result<Vec<&dyn Reflect>, AccessError>,
}

impl ListOps {
    /// Builds ops from raw functions, for sequence types defined elsewhere.
    pub const fn new(
        with_capacity: fn(usize) -> Box<dyn Reflect>,
        push: fn(&mut dyn Reflect, Box<dyn Reflect>) -> Result<(), AccessError>,
        items: fn(&dyn Reflect) -> Result<Vec<&dyn Reflect>, AccessError>,
    ) -> Self {
        Self {
            with_capacity,
            push,
            items,
        }
    }

    /// Ops of `Vec<T>`.
    pub fn vec<T: Typed>() -> Self {
        Self::new(
            |capacity| Box::new(Vec::<T>::with_capacity(capacity)),
            |list, item| {
                let item = assign::<T>(item, "[]")?;
                owner_mut::<Vec<T>>(list)?.push(item);
                Ok(())
            },
            |list| {
                Ok(owner_ref::<Vec<T>>(list)?
                    .iter()
                    .map(|item| item as &dyn Reflect)
                    .collect())
            },
        )
    }

    /// Creates an empty list.
    #[inline]
    pub fn with_capacity(&self, capacity: usize) -> Box<dyn Reflect> {
        (self.with_capacity)(capacity)
    }

    /// Appends `item` to `list`.
    #[inline]
    pub fn push(&self, list: &mut dyn Reflect, item: Box<dyn Reflect>) -> Result<(), AccessError> {
        (self.push)(list, item)
    }

    /// The items of `list`, in order.
    #[inline]
    pub fn items<'a>(&self, list: &'a dyn Reflect) -> Result<Vec<&'a dyn Reflect>, AccessError> {
        (self.items)(list)
    }
}

impl fmt::Debug for ListOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListOps")
    }
}

// -----------------------------------------------------------------------------
// MapOps

/// Erased operations of a string-keyed map such as `HashMap<String, V>`.
#[derive(Clone, Copy)]
pub struct MapOps {
    new: fn() -> Box<dyn Reflect>,
    insert: fn(&mut dyn Reflect, String, Box<dyn Reflect>) -> Result<(), AccessError>,
    entries: fn(&dyn Reflect) -> Result<Vec<(&str, &dyn Reflect)>, AccessError>,
}

impl MapOps {
    /// Builds ops from raw functions, for map types defined elsewhere.
    pub const fn new(
        new: fn() -> Box<dyn Reflect>,
        insert: fn(&mut dyn Reflect, String, Box<dyn Reflect>) -> Result<(), AccessError>,
        entries: fn(&dyn Reflect) -> Result<Vec<(&str, &dyn Reflect)>, AccessError>,
    ) -> Self {
        Self {
            new,
            insert,
            entries,
        }
    }

    /// Ops of `HashMap<String, V>`.
    pub fn hash_map<V: Typed>() -> Self {
        use std::collections::HashMap;
        Self::new(
            || Box::new(HashMap::<String, V>::new()),
            |map, key, value| {
                let value = assign::<V>(value, "{}")?;
                owner_mut::<HashMap<String, V>>(map)?.insert(key, value);
                Ok(())
            },
            |map| {
                Ok(owner_ref::<HashMap<String, V>>(map)?
                    .iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn Reflect))
                    .collect())
            },
        )
    }

    /// Ops of `BTreeMap<String, V>`.
    pub fn btree_map<V: Typed>() -> Self {
        use std::collections::BTreeMap;
        Self::new(
            || Box::new(BTreeMap::<String, V>::new()),
            |map, key, value| {
                let value = assign::<V>(value, "{}")?;
                owner_mut::<BTreeMap<String, V>>(map)?.insert(key, value);
                Ok(())
            },
            |map| {
                Ok(owner_ref::<BTreeMap<String, V>>(map)?
                    .iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn Reflect))
                    .collect())
            },
        )
    }

    /// Creates an empty map.
    #[inline]
    pub fn new_map(&self) -> Box<dyn Reflect> {
        (self.new)()
    }

    /// Inserts `value` under `key`.
    #[inline]
    pub fn insert(
        &self,
        map: &mut dyn Reflect,
        key: String,
        value: Box<dyn Reflect>,
    ) -> Result<(), AccessError> {
        (self.insert)(map, key, value)
    }

    /// The entries of `map`, in the map's iteration order.
    #[inline]
    pub fn entries<'a>(
        &self,
        map: &'a dyn Reflect,
    ) -> Result<Vec<(&'a str, &'a dyn Reflect)>, AccessError> {
        (self.entries)(map)
    }
}

impl fmt::Debug for MapOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapOps")
    }
}

// -----------------------------------------------------------------------------
// OptionOps

/// Erased operations of `Option<T>`.
///
/// # Examples
///
/// ```
/// use dm_reflect::info::OptionOps;
///
/// let ops = OptionOps::of::<i64>();
/// let some = ops.some(Box::new(3_i64)).unwrap();
/// assert!(ops.get(some.as_ref()).unwrap().is_some());
/// assert!(ops.get(ops.none().as_ref()).unwrap().is_none());
/// ```
#[derive(Clone, Copy)]
pub struct OptionOps {
    none: fn() -> Box<dyn Reflect>,
    some: fn(Box<dyn Reflect>) -> Result<Box<dyn Reflect>, AccessError>,
    get: fn(&dyn Reflect) -> Result<Option<&dyn Reflect>, AccessError>,
}

impl OptionOps {
    /// Ops of `Option<T>`.
    pub fn of<T: Typed>() -> Self {
        Self {
            none: || Box::new(None::<T>),
            some: |value| Ok(Box::new(Some(assign::<T>(value, "?")?))),
            get: |option| {
                Ok(owner_ref::<Option<T>>(option)?
                    .as_ref()
                    .map(|value| value as &dyn Reflect))
            },
        }
    }

    /// A boxed `None`.
    #[inline]
    pub fn none(&self) -> Box<dyn Reflect> {
        (self.none)()
    }

    /// Wraps `value` in `Some`.
    #[inline]
    pub fn some(&self, value: Box<dyn Reflect>) -> Result<Box<dyn Reflect>, AccessError> {
        (self.some)(value)
    }

    /// The inner value, `None` for a `None` option.
    #[inline]
    pub fn get<'a>(&self, option: &'a dyn Reflect) -> Result<Option<&'a dyn Reflect>, AccessError> {
        (self.get)(option)
    }
}

impl fmt::Debug for OptionOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionOps")
    }
}
