//! Document store contract
//!
//! The fixed CRUD contract the registry layer consumes. Every method is
//! async because real hosts reach their documents through I/O.
//!
//! ## Contract
//!
//! - Ids are assigned by the store on `create` and are unique per collection
//! - `get`, `update`, `update_meta` and `delete` report a missing id as
//!   `Ok(None)`; callers decide whether that is an error
//! - Writes into a locked pack fail with `HangarError::ReadOnly`
//! - Creating an embedded item under a missing owner fails with
//!   `HangarError::BackendUnavailable`
//! - Deleting an actor deletes its embedded items
//! - `list` returns documents in creation order

use async_trait::async_trait;

use hangar_core::{DocumentKind, EntityType, HangarResult, RawRecord};

use crate::document::{CollectionKey, Document, DocumentMeta, NewDocument, PackInfo};

/// Backend document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return it with its assigned id
    async fn create(&self, coll: &CollectionKey, doc: NewDocument) -> HangarResult<Document>;

    /// Fetch one document
    async fn get(&self, coll: &CollectionKey, id: &str) -> HangarResult<Option<Document>>;

    /// Overwrite a document's record; `None` if the id is absent
    async fn update(
        &self,
        coll: &CollectionKey,
        id: &str,
        data: RawRecord,
    ) -> HangarResult<Option<Document>>;

    /// Overwrite a document's metadata; `None` if the id is absent
    async fn update_meta(
        &self,
        coll: &CollectionKey,
        id: &str,
        meta: DocumentMeta,
    ) -> HangarResult<Option<Document>>;

    /// Remove a document, returning its last value
    async fn delete(&self, coll: &CollectionKey, id: &str) -> HangarResult<Option<Document>>;

    /// All documents of a collection, optionally restricted to one type
    async fn list(
        &self,
        coll: &CollectionKey,
        entity_type: Option<EntityType>,
    ) -> HangarResult<Vec<Document>>;

    /// Every content pack
    async fn packs(&self) -> HangarResult<Vec<PackInfo>>;

    /// One content pack
    async fn pack(&self, id: &str) -> HangarResult<Option<PackInfo>>;

    /// Return the pack with this id, creating it (unlocked) if missing
    async fn ensure_pack(&self, id: &str, kind: DocumentKind) -> HangarResult<PackInfo>;
}
