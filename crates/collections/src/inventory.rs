//! Items embedded in one actor
//!
//! Same contract as the world wrappers, scoped to the embedded item
//! collection of a single owner. The owner may be a top-level actor or an
//! actor stored in a content pack; in the latter case writes are governed
//! by that pack's lock.

use std::sync::Arc;

use async_trait::async_trait;

use hangar_core::{EntityType, HangarResult, RawRecord, WriteOutcome};
use hangar_storage::{CollectionKey, Document, DocumentMeta, DocumentStore, Parent};

use crate::scoped::ScopedCollection;
use crate::world::delegate_wrapper;
use crate::wrapper::CollectionWrapper;

/// Items of one type owned by one actor
#[derive(Clone)]
pub struct InventoryWrapper {
    inner: ScopedCollection,
    parent: Parent,
}

impl InventoryWrapper {
    /// Bind an item type to an actor's inventory
    ///
    /// # Arguments
    ///
    /// * `store` - Shared document store
    /// * `parent` - The owning actor
    /// * `ty` - An item-backed entity type
    pub fn new(store: Arc<dyn DocumentStore>, parent: Parent, ty: EntityType) -> Self {
        Self {
            inner: ScopedCollection::new(store, CollectionKey::embedded(parent.clone()), ty),
            parent,
        }
    }

    /// The owning actor
    pub fn parent(&self) -> &Parent {
        &self.parent
    }
}

delegate_wrapper!(InventoryWrapper);
