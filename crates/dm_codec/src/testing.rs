//! Shared fixtures of the crate's unit tests.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bson::Bson;
use bson::oid::ObjectId;
use dm_reflect::Reflect;
use dm_reflect::derive::{Mapped, MappedEnum, constructors};
use dm_reflect::impl_opaque;
use dm_reflect::info::Type;
use dm_utils::hash::HashMap;

use crate::CodecError;
use crate::codec::{Codec, CodecContext, CodecRegistry};
use crate::model::{Collection, IndexModel, ModelNamespace, Storage, StorageError};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Enums

#[derive(MappedEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    #[docmap(map_as = "A")]
    Active,
    #[docmap(map_as = "B")]
    Banned,
}

#[derive(MappedEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partial {
    #[docmap(map_as = "K")]
    Known,
    Unmapped,
}

#[derive(MappedEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeated {
    #[docmap(map_as = "X")]
    One,
    #[docmap(map_as = "X")]
    Two,
}

// -----------------------------------------------------------------------------
// Types and models

#[derive(Mapped, Debug, Clone, PartialEq, Default)]
#[docmap(mapped, default)]
pub struct Address {
    #[docmap(field)]
    pub city: String,
    #[docmap(field)]
    pub zip: Option<i32>,
}

#[derive(Mapped, Debug, Clone, PartialEq)]
#[docmap(model = "users", default)]
pub struct User {
    #[docmap(field = "_id")]
    pub id: Option<ObjectId>,
    #[docmap(field, unique)]
    pub email: String,
    #[docmap(field)]
    pub status: Status,
    #[docmap(field, use_default)]
    pub score: i32,
    #[docmap(field)]
    pub address: Option<Address>,
    #[docmap(field)]
    pub tags: Vec<String>,
    pub cache: Vec<u8>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            email: String::new(),
            status: Status::Active,
            score: 10,
            address: None,
            tags: Vec::new(),
            cache: Vec::new(),
        }
    }
}

#[derive(Mapped, Debug, Default)]
#[docmap(model = "teams", default)]
pub struct Team {
    #[docmap(field)]
    pub name: String,
    #[docmap(field)]
    pub members: Vec<User>,
}

#[derive(Mapped, Debug, Default)]
#[docmap(model = "logins", default)]
pub struct Login {
    #[docmap(field, unique)]
    pub user: String,
    #[docmap(field, unique)]
    pub token: String,
}

/// Derived without a mapping marker.
#[derive(Mapped, Debug, Default)]
pub struct Plain {
    #[docmap(field)]
    pub value: i32,
}

#[derive(Mapped, Debug, Default)]
#[docmap(model = "", default)]
pub struct EmptyModel {
    #[docmap(field)]
    pub value: i32,
}

#[derive(Mapped, Debug, Default)]
#[docmap(mapped, default, auto_register)]
pub struct Registered {
    #[docmap(field)]
    pub status: Status,
}

#[derive(Mapped, Debug, PartialEq)]
#[docmap(mapped)]
pub struct NoDefault {
    #[docmap(field)]
    pub value: i32,
}

// -----------------------------------------------------------------------------
// Reference graphs

#[derive(Mapped, Debug, Default)]
#[docmap(mapped, default)]
pub struct Parent {
    #[docmap(field)]
    pub name: String,
    #[docmap(field)]
    pub children: Vec<Child>,
}

#[derive(Mapped, Debug, Default)]
#[docmap(mapped, default)]
pub struct Child {
    #[docmap(field)]
    pub name: String,
    #[docmap(field)]
    pub parent: Option<Parent>,
}

#[derive(Mapped, Debug, Clone, PartialEq, Default)]
#[docmap(mapped, default)]
pub struct Node {
    #[docmap(field)]
    pub name: String,
    #[docmap(field)]
    pub children: Vec<Node>,
}

#[derive(Mapped, Debug, Default)]
#[docmap(mapped, default)]
pub struct Bag {
    #[docmap(field)]
    pub items: Vec<Repeated>,
}

#[derive(Mapped, Debug)]
#[docmap(mapped)]
pub struct HoldsPartial {
    #[docmap(field)]
    pub partial: Partial,
}

// -----------------------------------------------------------------------------
// Designated constructors

#[derive(Mapped, Debug, PartialEq)]
#[docmap(mapped, constructors)]
pub struct Point {
    #[docmap(field)]
    pub x: i32,
    #[docmap(field)]
    pub y: i32,
    #[docmap(field)]
    pub label: String,
}

#[constructors]
impl Point {
    #[docmap(constructor)]
    pub fn new(#[docmap(field = "x")] x: i32, #[docmap(field = "y")] y: i32) -> Self {
        Self {
            x,
            y,
            label: format!("{x},{y}"),
        }
    }
}

#[derive(Mapped, Debug, PartialEq)]
#[docmap(mapped, constructors)]
pub struct Pair {
    #[docmap(field)]
    pub a: i32,
    #[docmap(field)]
    pub b: Option<String>,
}

#[constructors]
impl Pair {
    #[docmap(constructor, full)]
    pub fn new(#[docmap(field = "a")] a: i32, #[docmap(field = "b")] b: Option<String>) -> Self {
        Self { a, b }
    }
}

#[derive(Mapped)]
#[docmap(mapped, constructors)]
pub struct Ambiguous {
    #[docmap(field)]
    pub value: i32,
}

#[constructors]
impl Ambiguous {
    #[docmap(constructor)]
    pub fn new(#[docmap(field = "value")] value: i32) -> Self {
        Self { value }
    }

    #[docmap(constructor)]
    pub fn zero() -> Self {
        Self { value: 0 }
    }
}

#[derive(Mapped)]
#[docmap(mapped, constructors)]
pub struct Unbound {
    #[docmap(field)]
    pub value: i32,
}

#[constructors]
impl Unbound {
    #[docmap(constructor)]
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

#[derive(Mapped)]
#[docmap(mapped, constructors)]
pub struct UnknownBinding {
    #[docmap(field)]
    pub value: i32,
}

#[constructors]
impl UnknownBinding {
    #[docmap(constructor)]
    pub fn new(#[docmap(field = "missing")] value: i32) -> Self {
        Self { value }
    }
}

#[derive(Mapped)]
#[docmap(mapped, constructors)]
pub struct Mismatched {
    #[docmap(field)]
    pub count: i64,
}

#[constructors]
impl Mismatched {
    #[docmap(constructor)]
    pub fn new(#[docmap(field = "count")] count: i32) -> Self {
        Self {
            count: i64::from(count),
        }
    }
}

#[derive(Mapped)]
#[docmap(mapped, constructors)]
pub struct Uncovered {
    #[docmap(field)]
    pub a: i32,
    #[docmap(field)]
    pub b: i32,
}

#[constructors]
impl Uncovered {
    #[docmap(constructor, full)]
    pub fn new(#[docmap(field = "a")] a: i32) -> Self {
        Self { a, b: 0 }
    }
}

// -----------------------------------------------------------------------------
// Invalid field layouts

#[derive(Mapped)]
#[docmap(mapped)]
pub struct StringId {
    #[docmap(field = "_id")]
    pub id: String,
}

#[derive(Mapped)]
#[docmap(mapped)]
pub struct Twice {
    #[docmap(field = "v")]
    pub first: i32,
    #[docmap(field = "v")]
    pub second: i32,
}

// -----------------------------------------------------------------------------
// Opaque values

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cents(pub i64);

impl_opaque!(Cents);

pub struct CentsCodec;

impl Codec for CentsCodec {
    fn target(&self) -> Type {
        Type::of::<Cents>()
    }

    fn encode(&self, value: &dyn Reflect, ctx: &CodecContext<'_>) -> Result<Bson, CodecError> {
        Ok(Bson::Int64(ctx.downcast::<Cents>(value)?.0))
    }

    fn decode(&self, value: &Bson, ctx: &CodecContext<'_>) -> Result<Box<dyn Reflect>, CodecError> {
        match value {
            Bson::Int64(cents) => Ok(Box::new(Cents(*cents))),
            _ => Err(ctx.unexpected("an int64", value)),
        }
    }
}

#[derive(Mapped, Debug, Default)]
#[docmap(mapped, default)]
pub struct Invoice {
    #[docmap(field)]
    pub total: Cents,
}

#[derive(Mapped, Debug, PartialEq, Default)]
#[docmap(model = "ledgers", default)]
pub struct Ledger {
    #[docmap(field = "_id")]
    pub id: Option<ObjectId>,
    #[docmap(field)]
    pub owner: String,
    #[docmap(field)]
    pub balance: Cents,
}

// -----------------------------------------------------------------------------
// Storage

type IndexLog = Arc<Mutex<HashMap<(String, String), Vec<IndexModel>>>>;

/// A storage backend that only records created indexes.
#[derive(Default)]
pub struct MemoryStorage {
    indexes: IndexLog,
    closed: AtomicBool,
}

impl MemoryStorage {
    pub fn indexes(&self, namespace: &str, collection: &str) -> Vec<IndexModel> {
        self.indexes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace.to_owned(), collection.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Storage for MemoryStorage {
    fn collection(&self, namespace: &str, name: &str) -> Result<Arc<dyn Collection>, StorageError> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(Arc::new(MemoryCollection {
            key: (namespace.to_owned(), name.to_owned()),
            indexes: self.indexes.clone(),
        }))
    }

    fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

struct MemoryCollection {
    key: (String, String),
    indexes: IndexLog,
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.key.1
    }

    fn create_index(&self, index: IndexModel) -> Result<(), StorageError> {
        self.indexes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.key.clone())
            .or_default()
            .push(index);
        Ok(())
    }
}

/// A namespace over a fresh [`MemoryStorage`].
pub fn memory_namespace(name: &str, types: &Arc<TypeRegistry>) -> ModelNamespace {
    ModelNamespace::new(
        name.to_owned(),
        Arc::new(MemoryStorage::default()),
        Arc::new(CodecRegistry::new(types.clone())),
    )
}
