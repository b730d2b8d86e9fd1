//! Small containers shared by the docmap crates.
//!
//! - [`hash`]: `hashbrown` maps with fixed `foldhash` seeds.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId).

// -----------------------------------------------------------------------------
// Modules

pub mod hash;

mod typeid_map;

// -----------------------------------------------------------------------------
// Exports

pub use typeid_map::TypeIdMap;
