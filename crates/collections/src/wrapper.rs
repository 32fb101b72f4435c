//! The collection wrapper contract
//!
//! | Operation | Contract |
//! |-----------|----------|
//! | `create` | Insert a new record, return the stored document |
//! | `get` | Document with this id and the bound type, or `None` |
//! | `update` | Overwrite the record; `StaleHandle` (logged) if absent |
//! | `set_meta` | Overwrite document metadata; same soft-fail |
//! | `destroy` | Remove the record, returning its last value |
//! | `enumerate` | Every document of the bound type, in creation order |
//! | `lookup_by_display_id` | First document whose `lid` matches |
//!
//! Writes against a missing id never fail the caller: bulk operations
//! must survive one stale reference.

use async_trait::async_trait;

use hangar_core::{EntityType, HangarResult, RawRecord, WriteOutcome};
use hangar_storage::{Document, DocumentMeta};

/// Uniform CRUD over one entity type in one backend
#[async_trait]
pub trait CollectionWrapper: Send + Sync {
    /// Entity type this wrapper is bound to
    fn entity_type(&self) -> EntityType;

    /// Short description of the backing collection, for logs
    fn describe(&self) -> String;

    /// Insert a new record
    async fn create(&self, raw: RawRecord) -> HangarResult<Document>;

    /// Fetch one document
    async fn get(&self, id: &str) -> HangarResult<Option<Document>>;

    /// Overwrite a record
    async fn update(&self, id: &str, raw: RawRecord) -> HangarResult<WriteOutcome>;

    /// Overwrite document metadata
    async fn set_meta(&self, id: &str, meta: DocumentMeta) -> HangarResult<WriteOutcome>;

    /// Remove a record, returning its last value
    async fn destroy(&self, id: &str) -> HangarResult<Option<RawRecord>>;

    /// Every document of the bound type
    async fn enumerate(&self) -> HangarResult<Vec<Document>>;

    /// Linear scan for a record whose human-readable id matches
    async fn lookup_by_display_id(&self, lid: &str) -> HangarResult<Option<Document>> {
        Ok(self
            .enumerate()
            .await?
            .into_iter()
            .find(|doc| doc.data.lid() == Some(lid)))
    }
}

/// Log a write that found nothing to write to
pub(crate) fn stale_write(collection: &str, id: &str, op: &str) -> WriteOutcome {
    tracing::warn!(
        target: "hangar::collections",
        collection = %collection,
        id = %id,
        op = op,
        "write target no longer exists; nothing written"
    );
    WriteOutcome::StaleHandle
}
