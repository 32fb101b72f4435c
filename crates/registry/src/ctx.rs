//! Operation contexts
//!
//! An `OpCtx` is the identity map of one top-level call tree: at most one
//! live entry per `(registry, type, id)`. Reference cycles terminate because
//! an entry is registered before its references are resolved, so the second
//! visit finds it.
//!
//! Inserts happen synchronously under a mutex that is never held across an
//! `.await`, which makes registration an atomic get-or-insert even when
//! several resolutions of the same key interleave on one task.
//!
//! The context owns the only strong handles to the entries it revived;
//! links between entries are weak. Drop the context when the call tree is
//! done.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use hangar_core::{EntityType, RegRef, RegistryName};

use crate::entry::LiveEntry;

/// Identity of a live entry within an operation context
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    /// Canonical name of the hosting registry
    pub registry: RegistryName,
    /// Entity type
    pub entity_type: EntityType,
    /// Storage id
    pub id: String,
}

impl EntryKey {
    /// Build a key
    pub fn new(registry: RegistryName, entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            registry,
            entity_type,
            id: id.into(),
        }
    }
}

/// Identity map for one operation
pub struct OpCtx {
    id: Uuid,
    entries: Mutex<FxHashMap<EntryKey, LiveEntry>>,
    /// `(source entry, destination registry)` → copy made by insinuation
    insinuated: Mutex<FxHashMap<(EntryKey, RegistryName), RegRef>>,
    revivals: AtomicUsize,
}

impl OpCtx {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            entries: Mutex::new(FxHashMap::default()),
            insinuated: Mutex::new(FxHashMap::default()),
            revivals: AtomicUsize::new(0),
        }
    }

    /// Unique id of this context
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Entry registered under `key`
    pub fn get(&self, key: &EntryKey) -> Option<LiveEntry> {
        self.entries.lock().get(key).cloned()
    }

    /// Whether `entry` was revived in this context
    pub fn owns(&self, entry: &LiveEntry) -> bool {
        entry.ctx_id() == self.id
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no entry is registered
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of revivals that ran to registration in this context
    pub fn revival_count(&self) -> usize {
        self.revivals.load(Ordering::Relaxed)
    }

    /// Register `entry` unless its key is taken
    ///
    /// Returns the registered entry and whether it is the one passed in.
    pub(crate) fn get_or_insert(&self, entry: LiveEntry) -> (LiveEntry, bool) {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(entry.key()) {
            return (existing.clone(), false);
        }
        entries.insert(entry.key().clone(), entry.clone());
        drop(entries);
        self.revivals.fetch_add(1, Ordering::Relaxed);
        (entry, true)
    }

    /// Unregister `entry` if it is still the one registered under its key
    pub(crate) fn remove(&self, entry: &LiveEntry) {
        let mut entries = self.entries.lock();
        if entries.get(entry.key()).is_some_and(|e| e.ptr_eq(entry)) {
            entries.remove(entry.key());
        }
    }

    pub(crate) fn insinuated(&self, source: &EntryKey, dest: &RegistryName) -> Option<RegRef> {
        self.insinuated
            .lock()
            .get(&(source.clone(), dest.clone()))
            .cloned()
    }

    pub(crate) fn record_insinuation(&self, source: EntryKey, dest: RegistryName, copy: RegRef) {
        self.insinuated.lock().insert((source, dest), copy);
    }

    pub(crate) fn forget_insinuation(&self, source: &EntryKey, dest: &RegistryName) {
        self.insinuated.lock().remove(&(source.clone(), dest.clone()));
    }
}

impl Default for OpCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpCtx")
            .field("id", &self.id)
            .field("entries", &self.len())
            .field("revivals", &self.revival_count())
            .finish()
    }
}
