//! Collection wrappers for Hangar
//!
//! This crate implements the four storage backends a category can be bound to:
//! - WorldItems: top-level items of one type
//! - WorldActors: top-level actors of one type
//! - InventoryWrapper: items of one type embedded in one actor
//! - CompendiumWrapper: documents of one type across every content pack
//!
//! All four are stateless facades over a shared `DocumentStore` (the
//! compendium keeps a local id cache) and implement one contract,
//! [`CollectionWrapper`], so the registry layer never knows which backend
//! it is talking to.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compendium;
pub mod inventory;
mod scoped;
pub mod world;
pub mod wrapper;

pub use compendium::{CompendiumConfig, CompendiumWrapper};
pub use inventory::InventoryWrapper;
pub use world::{WorldActors, WorldItems};
pub use wrapper::CollectionWrapper;
