//! Content-pack backend
//!
//! Reads span every pack whose document kind matches the bound type; new
//! records land in the type's home pack (`<prefix>.<type>`), which is
//! created on first write.
//!
//! # Cache
//!
//! Scanning every pack on each lookup is expensive, so the wrapper keeps an
//! id → (pack, document) map, populated lazily on first access and patched
//! in place by its own `create`, `update` and `destroy`. Each cache also
//! remembers the pack versions it was built from. With
//! `revalidate_on_pack_version` set, every access compares those against the
//! store and repopulates when some other writer has touched a pack.
//!
//! The cache mutex is never held across an `.await`: population builds a
//! fresh map off-lock and swaps it in.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use hangar_core::{DocumentKind, EntityType, HangarResult, RawRecord, WriteOutcome};
use hangar_storage::{CollectionKey, Document, DocumentMeta, DocumentStore, NewDocument, PackInfo};

use crate::wrapper::{stale_write, CollectionWrapper};

/// Compendium settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompendiumConfig {
    /// Home pack id is `<prefix>.<type>`
    pub home_pack_prefix: String,
    /// Repopulate the cache when a pack version changes
    pub revalidate_on_pack_version: bool,
    /// Restrict reads to these pack ids (the home pack is always read);
    /// empty means every pack
    pub packs: Vec<String>,
}

impl Default for CompendiumConfig {
    fn default() -> Self {
        Self {
            home_pack_prefix: "world".to_string(),
            revalidate_on_pack_version: true,
            packs: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct PackCache {
    /// Pack versions the cache reflects
    versions: FxHashMap<String, u64>,
    /// Documents by id, with the pack holding them
    docs: FxHashMap<String, (String, Document)>,
}

/// Documents of one type across every content pack
pub struct CompendiumWrapper {
    store: Arc<dyn DocumentStore>,
    ty: EntityType,
    config: CompendiumConfig,
    cache: Mutex<Option<PackCache>>,
}

impl CompendiumWrapper {
    /// Bind a type to the compendium
    ///
    /// # Arguments
    ///
    /// * `store` - Shared document store
    /// * `ty` - Any entity type
    /// * `config` - Home pack and cache settings
    pub fn new(store: Arc<dyn DocumentStore>, ty: EntityType, config: CompendiumConfig) -> Self {
        Self {
            store,
            ty,
            config,
            cache: Mutex::new(None),
        }
    }

    /// Id of the pack new records are written to
    pub fn home_pack(&self) -> String {
        format!("{}.{}", self.config.home_pack_prefix, self.ty)
    }

    /// Drop the cache; the next access repopulates it
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    /// Whether the cache is currently populated
    pub fn is_cached(&self) -> bool {
        self.cache.lock().is_some()
    }

    fn kind(&self) -> DocumentKind {
        self.ty.document_kind()
    }

    fn reads_pack(&self, pack: &PackInfo) -> bool {
        pack.kind == self.kind()
            && (self.config.packs.is_empty()
                || self.config.packs.contains(&pack.id)
                || pack.id == self.home_pack())
    }

    async fn relevant_packs(&self) -> HangarResult<Vec<PackInfo>> {
        let packs = self.store.packs().await?;
        Ok(packs.into_iter().filter(|p| self.reads_pack(p)).collect())
    }

    /// Make sure the cache is populated and, if configured, current
    async fn refresh(&self) -> HangarResult<()> {
        let cached_versions = self.cache.lock().as_ref().map(|c| c.versions.clone());
        let Some(cached_versions) = cached_versions else {
            return self.populate(None).await;
        };
        if !self.config.revalidate_on_pack_version {
            return Ok(());
        }

        let packs = self.relevant_packs().await?;
        let current: FxHashMap<String, u64> =
            packs.iter().map(|p| (p.id.clone(), p.version)).collect();
        if current != cached_versions {
            tracing::debug!(
                target: "hangar::collections",
                entity_type = %self.ty,
                "pack versions changed; repopulating compendium cache"
            );
            self.populate(Some(packs)).await?;
        }
        Ok(())
    }

    async fn populate(&self, packs: Option<Vec<PackInfo>>) -> HangarResult<()> {
        let packs = match packs {
            Some(packs) => packs,
            None => self.relevant_packs().await?,
        };

        let mut fresh = PackCache::default();
        for pack in &packs {
            let coll = CollectionKey::pack(pack.id.clone(), self.kind());
            for doc in self.store.list(&coll, Some(self.ty)).await? {
                fresh.docs.insert(doc.id.clone(), (pack.id.clone(), doc));
            }
            fresh.versions.insert(pack.id.clone(), pack.version);
        }

        tracing::debug!(
            target: "hangar::collections",
            entity_type = %self.ty,
            packs = packs.len(),
            documents = fresh.docs.len(),
            "compendium cache populated"
        );
        *self.cache.lock() = Some(fresh);
        Ok(())
    }

    /// Pack currently holding `id`
    async fn locate(&self, id: &str) -> HangarResult<Option<String>> {
        self.refresh().await?;
        Ok(self
            .cache
            .lock()
            .as_ref()
            .and_then(|c| c.docs.get(id).map(|(pack, _)| pack.clone())))
    }

    fn cached_version(&self, pack: &str) -> Option<u64> {
        self.cache
            .lock()
            .as_ref()
            .and_then(|c| c.versions.get(pack).copied())
    }

    /// Patch the cache after one of our own writes to `pack`
    ///
    /// The recorded pack version only advances if ours was the single write
    /// since the cache last saw the pack; otherwise the mismatch is left for
    /// the next `refresh` to repopulate.
    async fn after_write(
        &self,
        pack: &str,
        seen_version: Option<u64>,
        patch: impl FnOnce(&mut PackCache),
    ) -> HangarResult<()> {
        let now = self.store.pack(pack).await?.map(|p| p.version);
        let mut guard = self.cache.lock();
        if let Some(cache) = guard.as_mut() {
            patch(cache);
            match (seen_version, now) {
                (Some(seen), Some(now)) if now == seen + 1 => {
                    cache.versions.insert(pack.to_string(), now);
                }
                (None, Some(1)) => {
                    cache.versions.insert(pack.to_string(), 1);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn coll(&self, pack: &str) -> CollectionKey {
        CollectionKey::pack(pack.to_string(), self.kind())
    }
}

#[async_trait]
impl CollectionWrapper for CompendiumWrapper {
    fn entity_type(&self) -> EntityType {
        self.ty
    }

    fn describe(&self) -> String {
        format!("compendium/{}", self.ty)
    }

    async fn create(&self, raw: RawRecord) -> HangarResult<Document> {
        let home = self.home_pack();
        self.store.ensure_pack(&home, self.kind()).await?;
        let data = raw.populated_from(&self.ty.default_record());
        let seen = self.cached_version(&home);

        let doc = self
            .store
            .create(&self.coll(&home), NewDocument::from_record(self.ty, data))
            .await?;
        let entry = (home.clone(), doc.clone());
        self.after_write(&home, seen, |cache| {
            cache.docs.insert(doc.id.clone(), entry);
        })
        .await?;
        Ok(doc)
    }

    async fn get(&self, id: &str) -> HangarResult<Option<Document>> {
        self.refresh().await?;
        Ok(self
            .cache
            .lock()
            .as_ref()
            .and_then(|c| c.docs.get(id).map(|(_, doc)| doc.clone())))
    }

    async fn update(&self, id: &str, raw: RawRecord) -> HangarResult<WriteOutcome> {
        let Some(pack) = self.locate(id).await? else {
            return Ok(stale_write(&self.describe(), id, "update"));
        };
        let seen = self.cached_version(&pack);
        match self.store.update(&self.coll(&pack), id, raw).await? {
            Some(doc) => {
                let entry = (pack.clone(), doc);
                self.after_write(&pack, seen, |cache| {
                    cache.docs.insert(id.to_string(), entry);
                })
                .await?;
                Ok(WriteOutcome::Applied)
            }
            None => {
                self.invalidate();
                Ok(stale_write(&self.describe(), id, "update"))
            }
        }
    }

    async fn set_meta(&self, id: &str, meta: DocumentMeta) -> HangarResult<WriteOutcome> {
        let Some(pack) = self.locate(id).await? else {
            return Ok(stale_write(&self.describe(), id, "set_meta"));
        };
        let seen = self.cached_version(&pack);
        match self.store.update_meta(&self.coll(&pack), id, meta).await? {
            Some(doc) => {
                let entry = (pack.clone(), doc);
                self.after_write(&pack, seen, |cache| {
                    cache.docs.insert(id.to_string(), entry);
                })
                .await?;
                Ok(WriteOutcome::Applied)
            }
            None => {
                self.invalidate();
                Ok(stale_write(&self.describe(), id, "set_meta"))
            }
        }
    }

    async fn destroy(&self, id: &str) -> HangarResult<Option<RawRecord>> {
        let Some(pack) = self.locate(id).await? else {
            return Ok(None);
        };
        let seen = self.cached_version(&pack);
        let removed = self.store.delete(&self.coll(&pack), id).await?;
        if removed.is_some() {
            self.after_write(&pack, seen, |cache| {
                cache.docs.remove(id);
            })
            .await?;
        } else {
            self.invalidate();
        }
        Ok(removed.map(|doc| doc.data))
    }

    async fn enumerate(&self) -> HangarResult<Vec<Document>> {
        self.refresh().await?;
        let mut docs: Vec<Document> = self
            .cache
            .lock()
            .as_ref()
            .map(|c| c.docs.values().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default();
        docs.sort_by_key(|d| d.sort);
        Ok(docs)
    }
}
