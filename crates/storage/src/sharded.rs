//! Sharded in-memory document store
//!
//! One DashMap entry per collection, an FxHashMap of documents within.
//!
//! # Design
//!
//! - DashMap keyed by CollectionKey: writes to one collection never lock another
//! - FxHashMap: O(1) lookups by document id
//! - Store-wide AtomicU64 write counter stamped on every document write
//! - Per-pack version bumped on every write governed by that pack
//!
//! No DashMap guard is ever held across an `.await`; every async method
//! finishes its map work synchronously after the optional yield point.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rustc_hash::FxHashMap;

use hangar_core::{new_id, DocumentKind, EntityType, HangarError, HangarResult, RawRecord};

use crate::document::{
    AccessMode, CollectionKey, Document, DocumentMeta, NewDocument, PackInfo, Parent, Scope,
};
use crate::store::DocumentStore;

/// One collection's documents
#[derive(Debug, Default)]
pub struct Shard {
    /// Documents by id
    pub(crate) docs: FxHashMap<String, Document>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in this shard
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// In-process [`DocumentStore`]
///
/// # Example
///
/// ```ignore
/// use hangar_storage::{MemoryStore, PackInfo};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// store.add_pack(PackInfo::new("core.frames", "Frames", DocumentKind::Item));
/// ```
pub struct MemoryStore {
    /// Per-collection shards
    shards: DashMap<CollectionKey, Shard>,
    /// Content packs by id
    packs: DashMap<String, PackInfo>,
    /// Store-wide write counter
    version: AtomicU64,
    /// Creation order counter
    sort: AtomicU64,
    /// Yield to the scheduler at the start of every operation
    yield_points: bool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            packs: DashMap::new(),
            version: AtomicU64::new(0),
            sort: AtomicU64::new(0),
            yield_points: false,
        }
    }

    /// Create an empty store that yields at every operation
    ///
    /// Mimics a host whose document access suspends, so concurrent callers
    /// on one task interleave at each store call.
    pub fn with_yield_points() -> Self {
        Self {
            yield_points: true,
            ..Self::new()
        }
    }

    /// Current store-wide write counter
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Register a content pack, replacing any pack with the same id
    pub fn add_pack(&self, info: PackInfo) {
        self.packs.insert(info.id.clone(), info);
    }

    /// Lock or unlock a pack; `false` if the pack does not exist
    pub fn set_pack_access(&self, id: &str, access: AccessMode) -> bool {
        match self.packs.get_mut(id) {
            Some(mut pack) => {
                pack.access = access;
                true
            }
            None => false,
        }
    }

    /// Number of non-empty collections
    pub fn shard_count(&self) -> usize {
        self.shards.iter().filter(|s| !s.value().is_empty()).count()
    }

    /// Total documents across all collections
    pub fn total_documents(&self) -> usize {
        self.shards.iter().map(|s| s.value().len()).sum()
    }

    /// Number of documents in one collection
    pub fn collection_len(&self, coll: &CollectionKey) -> usize {
        self.shards.get(coll).map(|s| s.len()).unwrap_or(0)
    }

    async fn io_point(&self) {
        if self.yield_points {
            tokio::task::yield_now().await;
        }
    }

    fn check_writable(&self, coll: &CollectionKey) -> HangarResult<()> {
        let Some(pack_id) = coll.pack_id() else {
            return Ok(());
        };
        let pack = self
            .packs
            .get(pack_id)
            .ok_or_else(|| HangarError::storage(format!("unknown pack '{}'", pack_id)))?;
        if pack.is_locked() {
            return Err(HangarError::ReadOnly {
                pack: pack_id.to_string(),
            });
        }
        if matches!(coll.scope, Scope::Pack(_)) && pack.kind != coll.kind {
            return Err(HangarError::storage(format!(
                "pack '{}' does not hold {:?} documents",
                pack_id, coll.kind
            )));
        }
        Ok(())
    }

    fn touch_pack(&self, coll: &CollectionKey) {
        if let Some(pack_id) = coll.pack_id() {
            if let Some(mut pack) = self.packs.get_mut(pack_id) {
                pack.version += 1;
            }
        }
    }

    fn parent_exists(&self, parent: &Parent) -> bool {
        self.shards
            .get(&parent.collection())
            .map(|shard| shard.docs.contains_key(&parent.actor_id))
            .unwrap_or(false)
    }

    /// Apply `f` to a stored document; `None` if absent
    fn modify(
        &self,
        coll: &CollectionKey,
        id: &str,
        f: impl FnOnce(&mut Document),
    ) -> Option<Document> {
        let updated = self.shards.get_mut(coll).and_then(|mut shard| {
            let doc = shard.docs.get_mut(id)?;
            f(doc);
            doc.version = self.next_version();
            doc.modified = Utc::now().timestamp();
            Some(doc.clone())
        });
        if updated.is_some() {
            self.touch_pack(coll);
        }
        updated
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("shard_count", &self.shard_count())
            .field("pack_count", &self.packs.len())
            .field("version", &self.version())
            .field("total_documents", &self.total_documents())
            .finish()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, coll: &CollectionKey, doc: NewDocument) -> HangarResult<Document> {
        self.io_point().await;
        self.check_writable(coll)?;
        if doc.entity_type.document_kind() != coll.kind {
            return Err(HangarError::storage(format!(
                "cannot store {} in {}",
                doc.entity_type, coll
            )));
        }
        if let Scope::Embedded(parent) = &coll.scope {
            if !self.parent_exists(parent) {
                return Err(HangarError::BackendUnavailable {
                    name: coll.to_string(),
                });
            }
        }

        let mut shard = self.shards.entry(coll.clone()).or_default();
        let mut id = new_id();
        while shard.docs.contains_key(&id) {
            id = new_id();
        }
        let stored = Document {
            id,
            entity_type: doc.entity_type,
            meta: doc.meta,
            data: doc.data,
            version: self.next_version(),
            sort: self.sort.fetch_add(1, Ordering::AcqRel),
            modified: Utc::now().timestamp(),
        };
        shard.docs.insert(stored.id.clone(), stored.clone());
        drop(shard);
        self.touch_pack(coll);

        tracing::debug!(
            target: "hangar::storage",
            collection = %coll,
            id = %stored.id,
            entity_type = %stored.entity_type,
            "document created"
        );
        Ok(stored)
    }

    async fn get(&self, coll: &CollectionKey, id: &str) -> HangarResult<Option<Document>> {
        self.io_point().await;
        Ok(self
            .shards
            .get(coll)
            .and_then(|shard| shard.docs.get(id).cloned()))
    }

    async fn update(
        &self,
        coll: &CollectionKey,
        id: &str,
        data: RawRecord,
    ) -> HangarResult<Option<Document>> {
        self.io_point().await;
        self.check_writable(coll)?;
        Ok(self.modify(coll, id, |doc| doc.data = data))
    }

    async fn update_meta(
        &self,
        coll: &CollectionKey,
        id: &str,
        meta: DocumentMeta,
    ) -> HangarResult<Option<Document>> {
        self.io_point().await;
        self.check_writable(coll)?;
        Ok(self.modify(coll, id, |doc| doc.meta = meta))
    }

    async fn delete(&self, coll: &CollectionKey, id: &str) -> HangarResult<Option<Document>> {
        self.io_point().await;
        self.check_writable(coll)?;
        let removed = self
            .shards
            .get_mut(coll)
            .and_then(|mut shard| shard.docs.remove(id));
        let Some(removed) = removed else {
            return Ok(None);
        };
        self.next_version();
        self.touch_pack(coll);

        // An actor's inventory goes with it
        if coll.kind == DocumentKind::Actor {
            let parent = match &coll.scope {
                Scope::World => Some(Parent::world(id)),
                Scope::Pack(pack) => Some(Parent::in_pack(pack.clone(), id)),
                Scope::Embedded(_) => None,
            };
            if let Some(parent) = parent {
                self.shards.remove(&CollectionKey::embedded(parent));
            }
        }

        tracing::debug!(
            target: "hangar::storage",
            collection = %coll,
            id = %id,
            "document deleted"
        );
        Ok(Some(removed))
    }

    async fn list(
        &self,
        coll: &CollectionKey,
        entity_type: Option<EntityType>,
    ) -> HangarResult<Vec<Document>> {
        self.io_point().await;
        let mut docs: Vec<Document> = self
            .shards
            .get(coll)
            .map(|shard| {
                shard
                    .docs
                    .values()
                    .filter(|d| entity_type.map_or(true, |t| d.entity_type == t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by_key(|d| d.sort);
        Ok(docs)
    }

    async fn packs(&self) -> HangarResult<Vec<PackInfo>> {
        self.io_point().await;
        let mut packs: Vec<PackInfo> = self.packs.iter().map(|p| p.value().clone()).collect();
        packs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(packs)
    }

    async fn pack(&self, id: &str) -> HangarResult<Option<PackInfo>> {
        self.io_point().await;
        Ok(self.packs.get(id).map(|p| p.value().clone()))
    }

    async fn ensure_pack(&self, id: &str, kind: DocumentKind) -> HangarResult<PackInfo> {
        self.io_point().await;
        let pack = self
            .packs
            .entry(id.to_string())
            .or_insert_with(|| PackInfo::new(id, id, kind))
            .value()
            .clone();
        if pack.kind != kind {
            return Err(HangarError::storage(format!(
                "pack '{}' holds {:?} documents, not {:?}",
                id, pack.kind, kind
            )));
        }
        Ok(pack)
    }
}
