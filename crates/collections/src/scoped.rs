//! One entity type inside one fixed store collection
//!
//! Shared by the world and inventory wrappers, which differ only in the
//! collection they address.

use std::sync::Arc;

use hangar_core::{EntityType, HangarResult, RawRecord, WriteOutcome};
use hangar_storage::{CollectionKey, Document, DocumentMeta, DocumentStore, NewDocument};

use crate::wrapper::stale_write;

#[derive(Clone)]
pub(crate) struct ScopedCollection {
    store: Arc<dyn DocumentStore>,
    coll: CollectionKey,
    ty: EntityType,
}

impl ScopedCollection {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, coll: CollectionKey, ty: EntityType) -> Self {
        debug_assert_eq!(coll.kind, ty.document_kind());
        Self { store, coll, ty }
    }

    pub(crate) fn entity_type(&self) -> EntityType {
        self.ty
    }

    pub(crate) fn collection(&self) -> &CollectionKey {
        &self.coll
    }

    /// Create, then immediately rewrite the record overlaid onto the
    /// type's defaults so every schema field is present
    pub(crate) async fn create(&self, raw: RawRecord) -> HangarResult<Document> {
        let created = self
            .store
            .create(&self.coll, NewDocument::from_record(self.ty, raw))
            .await?;
        let populated = created.data.populated_from(&self.ty.default_record());
        let stored = self.store.update(&self.coll, &created.id, populated).await?;
        Ok(stored.unwrap_or(created))
    }

    pub(crate) async fn get(&self, id: &str) -> HangarResult<Option<Document>> {
        Ok(self
            .store
            .get(&self.coll, id)
            .await?
            .filter(|doc| doc.entity_type == self.ty))
    }

    pub(crate) async fn update(&self, id: &str, raw: RawRecord) -> HangarResult<WriteOutcome> {
        if self.get(id).await?.is_none() {
            return Ok(stale_write(&self.coll.to_string(), id, "update"));
        }
        match self.store.update(&self.coll, id, raw).await? {
            Some(_) => Ok(WriteOutcome::Applied),
            None => Ok(stale_write(&self.coll.to_string(), id, "update")),
        }
    }

    pub(crate) async fn set_meta(&self, id: &str, meta: DocumentMeta) -> HangarResult<WriteOutcome> {
        if self.get(id).await?.is_none() {
            return Ok(stale_write(&self.coll.to_string(), id, "set_meta"));
        }
        match self.store.update_meta(&self.coll, id, meta).await? {
            Some(_) => Ok(WriteOutcome::Applied),
            None => Ok(stale_write(&self.coll.to_string(), id, "set_meta")),
        }
    }

    pub(crate) async fn destroy(&self, id: &str) -> HangarResult<Option<RawRecord>> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }
        Ok(self.store.delete(&self.coll, id).await?.map(|doc| doc.data))
    }

    pub(crate) async fn enumerate(&self) -> HangarResult<Vec<Document>> {
        self.store.list(&self.coll, Some(self.ty)).await
    }
}
