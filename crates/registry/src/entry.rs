//! Live entries
//!
//! A `LiveEntry` is a revived record: the raw data plus a back-reference to
//! the physical document it came from and the wrapper that stores it. It is
//! a cheap `Arc` handle; clones share state.
//!
//! Entry state machine: `Registered -> Ready` or `Registered -> Failed`.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use uuid::Uuid;

use hangar_collections::CollectionWrapper;
use hangar_core::{EntityType, HangarResult, RawRecord, RecordPath, RegRef, RegistryName, WriteOutcome};
use hangar_storage::Document;

use crate::ctx::EntryKey;

/// Revival progress of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// In the context; references still being resolved
    Registered,
    /// Every reference field resolved
    Ready,
    /// Revival failed; the entry has been removed from its context
    Failed,
}

/// Resolved targets of one reference field, in record order
type Slots = Vec<Option<Weak<EntryInner>>>;

pub(crate) struct EntryInner {
    key: EntryKey,
    ctx_id: Uuid,
    document: Document,
    wrapper: Arc<dyn CollectionWrapper>,
    data: RwLock<RawRecord>,
    state: Mutex<EntryState>,
    resolved: Mutex<FxHashMap<String, Slots>>,
}

/// Revived entity, valid for the operation context that produced it
#[derive(Clone)]
pub struct LiveEntry(Arc<EntryInner>);

impl LiveEntry {
    pub(crate) fn new(
        key: EntryKey,
        ctx_id: Uuid,
        document: Document,
        wrapper: Arc<dyn CollectionWrapper>,
    ) -> Self {
        let data = RwLock::new(document.data.clone());
        LiveEntry(Arc::new(EntryInner {
            key,
            ctx_id,
            document,
            wrapper,
            data,
            state: Mutex::new(EntryState::Registered),
            resolved: Mutex::new(FxHashMap::default()),
        }))
    }

    /// Identity within the operation context
    pub fn key(&self) -> &EntryKey {
        &self.0.key
    }

    /// Storage id
    pub fn id(&self) -> &str {
        &self.0.key.id
    }

    /// Entity type
    pub fn entity_type(&self) -> EntityType {
        self.0.key.entity_type
    }

    /// Canonical name of the hosting registry
    pub fn registry_name(&self) -> &RegistryName {
        &self.0.key.registry
    }

    /// Id of the operation context that revived this entry
    pub fn ctx_id(&self) -> Uuid {
        self.0.ctx_id
    }

    /// The physical document as it was when the entry was revived
    pub fn document(&self) -> &Document {
        &self.0.document
    }

    /// Reference to this entry, carrying its display id as fallback
    #[allow(clippy::should_implement_trait)]
    pub fn as_ref(&self) -> RegRef {
        RegRef::new(self.id(), self.entity_type(), self.registry_name().clone())
            .with_fallback(self.0.data.read().display_id())
    }

    /// Current record, including unsaved changes
    pub fn data(&self) -> RawRecord {
        self.0.data.read().clone()
    }

    /// Write `value` at `path` in the in-memory record
    ///
    /// Nothing is persisted until [`LiveEntry::write_back`].
    pub fn set_field(&self, path: &RecordPath, value: Value) -> HangarResult<()> {
        self.0.data.write().set(path, value)
    }

    /// Persist the in-memory record through the wrapper it was read from
    pub async fn write_back(&self) -> HangarResult<WriteOutcome> {
        let data = self.data();
        self.0.wrapper.update(self.id(), data).await
    }

    /// Revival progress
    pub fn state(&self) -> EntryState {
        *self.0.state.lock()
    }

    /// Whether both handles are the same entry
    pub fn ptr_eq(&self, other: &LiveEntry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Targets of a reference field, in record order
    ///
    /// `None` slots are references that could not be resolved. Targets are
    /// held weakly and disappear once their operation context is dropped.
    /// Returns an empty list for a field that is not a reference field.
    pub fn resolved(&self, field: &str) -> Vec<Option<LiveEntry>> {
        self.0
            .resolved
            .lock()
            .get(field)
            .map(|slots| {
                slots
                    .iter()
                    .map(|slot| slot.as_ref().and_then(Weak::upgrade).map(LiveEntry))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First resolved target of a reference field
    pub fn resolved_one(&self, field: &str) -> Option<LiveEntry> {
        self.resolved(field).into_iter().flatten().next()
    }

    pub(crate) fn set_state(&self, state: EntryState) {
        *self.0.state.lock() = state;
    }

    pub(crate) fn set_resolved(&self, field: String, targets: &[Option<LiveEntry>]) {
        let slots = targets
            .iter()
            .map(|t| t.as_ref().map(|e| Arc::downgrade(&e.0)))
            .collect();
        self.0.resolved.lock().insert(field, slots);
    }
}

impl fmt::Debug for LiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveEntry")
            .field("registry", &self.registry_name().to_string())
            .field("entity_type", &self.entity_type())
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_collections::WorldItems;
    use hangar_storage::{DocumentStore, MemoryStore};
    use serde_json::json;

    async fn setup() -> LiveEntry {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let wrapper = Arc::new(WorldItems::new(store, EntityType::MechWeapon));
        let doc = wrapper
            .create(RawRecord::from_value(json!({"lid": "mw_rifle", "name": "Rifle"})))
            .await
            .unwrap();
        let key = EntryKey::new(RegistryName::World, EntityType::MechWeapon, doc.id.clone());
        LiveEntry::new(key, Uuid::new_v4(), doc, wrapper)
    }

    #[tokio::test]
    async fn test_as_ref_carries_fallback() {
        let entry = setup().await;
        let r = entry.as_ref();
        assert_eq!(r.id, entry.id());
        assert_eq!(r.entity_type, EntityType::MechWeapon);
        assert_eq!(r.registry_name, RegistryName::World);
        assert_eq!(r.fallback_display_id, "mw_rifle");
    }

    #[tokio::test]
    async fn test_set_field_then_write_back() {
        let entry = setup().await;
        let path: RecordPath = "loaded".parse().unwrap();
        entry.set_field(&path, json!(false)).unwrap();
        assert_eq!(entry.data()["loaded"], json!(false));
        assert_eq!(entry.document().data["loaded"], json!(true));

        assert!(entry.write_back().await.unwrap().is_applied());
        let stored = entry.0.wrapper.get(entry.id()).await.unwrap().unwrap();
        assert_eq!(stored.data["loaded"], json!(false));
    }

    #[tokio::test]
    async fn test_write_back_after_destroy_is_stale() {
        let entry = setup().await;
        entry.0.wrapper.destroy(entry.id()).await.unwrap();
        assert_eq!(entry.write_back().await.unwrap(), WriteOutcome::StaleHandle);
    }

    #[tokio::test]
    async fn test_resolved_links_are_weak() {
        let entry = setup().await;
        let other = setup().await;
        entry.set_resolved("mods".to_string(), &[Some(other.clone()), None]);

        let slots = entry.resolved("mods");
        assert_eq!(slots.len(), 2);
        assert!(slots[0].as_ref().unwrap().ptr_eq(&other));
        assert!(slots[1].is_none());
        drop(slots);

        drop(other);
        assert!(entry.resolved_one("mods").is_none());
        assert!(entry.resolved("not_a_field").is_empty());
    }

    #[tokio::test]
    async fn test_state_and_identity() {
        let entry = setup().await;
        assert_eq!(entry.state(), EntryState::Registered);
        entry.set_state(EntryState::Ready);
        assert_eq!(entry.state(), EntryState::Ready);
        assert!(entry.ptr_eq(&entry.clone()));
        assert!(format!("{:?}", entry).contains("mech_weapon"));
    }
}
