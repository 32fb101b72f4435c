//! Backend document store for Hangar
//!
//! The registry layer never touches physical storage directly; it talks to
//! a [`DocumentStore`]. A store holds documents in collections addressed by
//! a [`CollectionKey`]: top-level world actors/items, the contents of a
//! content pack, or the items embedded in one actor.
//!
//! [`MemoryStore`] is the in-process implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod sharded;
pub mod store;

pub use document::{
    AccessMode, CollectionKey, Document, DocumentMeta, NewDocument, PackInfo, Parent, Scope,
    TokenMeta,
};
pub use sharded::{MemoryStore, Shard};
pub use store::DocumentStore;
