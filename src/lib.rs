#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use bson;
pub use dm_codec as codec;
pub use dm_reflect as reflect;
pub use dm_utils as utils;

pub use dm_reflect::derive::{Mapped, MappedEnum, constructors};
