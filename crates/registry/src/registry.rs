//! Registries
//!
//! A registry is one storage partition (backend + owner) with a category for
//! every entity type. It resolves references, switching to other
//! registries by name through its factory, and exposes per-type CRUD.
//!
//! # Resolution
//!
//! `resolve` never reports absence as an error: an unknown registry, a
//! missing owner actor or a missing record all yield `Ok(None)`. The only
//! hard errors are revival failures and backend faults.

use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;

use hangar_core::{
    EntityType, HangarError, HangarResult, RawRecord, RegRef, RegistryName, WriteOutcome,
};
use hangar_storage::DocumentMeta;

use crate::category::Category;
use crate::ctx::OpCtx;
use crate::entry::LiveEntry;
use crate::factory::RegistryFactory;
use crate::BoxFuture;

/// One storage partition
pub struct Registry {
    name: RegistryName,
    categories: FxHashMap<EntityType, Category>,
    factory: Weak<RegistryFactory>,
    copy_metadata: bool,
}

impl Registry {
    /// Assemble a registry from its categories
    ///
    /// `name` must be canonical; the ambiguous `actor:` form is resolved by
    /// the factory before a registry is built.
    pub(crate) fn new(
        name: RegistryName,
        categories: impl IntoIterator<Item = Category>,
        factory: Weak<RegistryFactory>,
        copy_metadata: bool,
    ) -> Self {
        debug_assert!(name.is_canonical());
        Self {
            name,
            categories: categories
                .into_iter()
                .map(|c| (c.entity_type(), c))
                .collect(),
            factory,
            copy_metadata,
        }
    }

    /// Canonical name
    pub fn name(&self) -> &RegistryName {
        &self.name
    }

    /// Category bound to `ty`
    pub fn category(&self, ty: EntityType) -> Option<&Category> {
        self.categories.get(&ty)
    }

    pub(crate) fn copy_metadata(&self) -> bool {
        self.copy_metadata
    }

    fn require(&self, ty: EntityType) -> HangarResult<&Category> {
        self.category(ty).ok_or_else(|| {
            HangarError::storage(format!("registry '{}' has no category for {}", self.name, ty))
        })
    }

    /// Registry with the given name, built or fetched from the cache
    ///
    /// `None` when the backend is unavailable.
    pub async fn switch(&self, name: &RegistryName) -> HangarResult<Option<Arc<Registry>>> {
        let Some(factory) = self.factory.upgrade() else {
            tracing::warn!(
                target: "hangar::registry",
                from = %self.name,
                to = %name,
                "registry factory dropped; cannot switch"
            );
            return Ok(None);
        };
        factory.switch(name).await
    }

    /// Resolve a reference into a live entry inside `ctx`
    ///
    /// On success the entry is registered in `ctx` before it is returned.
    pub fn resolve<'a>(
        &'a self,
        ctx: &'a OpCtx,
        r: &'a RegRef,
    ) -> BoxFuture<'a, HangarResult<Option<LiveEntry>>> {
        Box::pin(async move {
            if r.registry_name == self.name {
                return self.resolve_local(ctx, r.entity_type, &r.id).await;
            }
            match self.switch(&r.registry_name).await? {
                Some(target) => target.resolve_local(ctx, r.entity_type, &r.id).await,
                None => {
                    tracing::warn!(
                        target: "hangar::registry",
                        reference = %r,
                        "referenced registry is unavailable"
                    );
                    Ok(None)
                }
            }
        })
    }

    async fn resolve_local(
        &self,
        ctx: &OpCtx,
        ty: EntityType,
        id: &str,
    ) -> HangarResult<Option<LiveEntry>> {
        let Some(category) = self.category(ty) else {
            return Ok(None);
        };
        match category.wrapper().get(id).await? {
            Some(doc) => Ok(Some(category.revive(self, ctx, doc).await?)),
            None => Ok(None),
        }
    }

    /// Every entity of a type, revived inside `ctx`
    pub async fn enumerate(&self, ctx: &OpCtx, ty: EntityType) -> HangarResult<Vec<LiveEntry>> {
        let category = self.require(ty)?;
        let docs = category.wrapper().enumerate().await?;
        let mut entries = Vec::with_capacity(docs.len());
        for doc in docs {
            entries.push(category.revive(self, ctx, doc).await?);
        }
        Ok(entries)
    }

    /// Stored record without revival
    pub async fn get_raw(&self, ty: EntityType, id: &str) -> HangarResult<Option<RawRecord>> {
        let doc = self.require(ty)?.wrapper().get(id).await?;
        Ok(doc.map(|d| d.data))
    }

    /// Store a new record and return a reference to it
    pub async fn create(&self, ty: EntityType, raw: RawRecord) -> HangarResult<RegRef> {
        let doc = self.require(ty)?.wrapper().create(raw).await?;
        Ok(RegRef::new(doc.id, ty, self.name.clone()).with_fallback(doc.data.display_id()))
    }

    /// Overwrite a stored record
    pub async fn update(&self, ty: EntityType, id: &str, raw: RawRecord) -> HangarResult<WriteOutcome> {
        self.require(ty)?.wrapper().update(id, raw).await
    }

    /// Overwrite several records; stale ids do not stop the batch
    pub async fn update_many(
        &self,
        ty: EntityType,
        updates: Vec<(String, RawRecord)>,
    ) -> HangarResult<Vec<WriteOutcome>> {
        let wrapper = self.require(ty)?.wrapper();
        let mut outcomes = Vec::with_capacity(updates.len());
        for (id, raw) in updates {
            outcomes.push(wrapper.update(&id, raw).await?);
        }
        Ok(outcomes)
    }

    /// Overwrite document metadata
    pub async fn set_meta(
        &self,
        ty: EntityType,
        id: &str,
        meta: DocumentMeta,
    ) -> HangarResult<WriteOutcome> {
        self.require(ty)?.wrapper().set_meta(id, meta).await
    }

    /// Remove a record, returning its last value
    pub async fn destroy(&self, ty: EntityType, id: &str) -> HangarResult<Option<RawRecord>> {
        self.require(ty)?.wrapper().destroy(id).await
    }

    /// Store a default record of `ty` and revive it
    pub async fn create_default(&self, ctx: &OpCtx, ty: EntityType) -> HangarResult<LiveEntry> {
        self.require(ty)?.create_default(self, ctx).await
    }

    /// Store `raw` and revive it
    pub async fn create_live(
        &self,
        ctx: &OpCtx,
        ty: EntityType,
        raw: RawRecord,
    ) -> HangarResult<LiveEntry> {
        self.require(ty)?.create_live(self, ctx, raw).await
    }

    /// Reference to the first record whose `lid` matches
    pub async fn lookup_by_display_id(&self, ty: EntityType, lid: &str) -> HangarResult<Option<RegRef>> {
        let doc = self.require(ty)?.wrapper().lookup_by_display_id(lid).await?;
        Ok(doc.map(|d| RegRef::new(d.id, ty, self.name.clone()).with_fallback(lid)))
    }

    /// Copy `entity` and everything it owns into `dest`
    ///
    /// Fresh ids are allocated at every level and the source is never
    /// written. Within one `ctx` each source entry is copied at most once
    /// per destination, so shared children are copied once and owned cycles
    /// terminate. The copy is returned revived from `dest` inside `ctx`.
    ///
    /// The source is the registry `entity` was revived from, which need not
    /// be `self`.
    ///
    /// # Errors
    ///
    /// `ContextMismatch` if `entity` was revived in another context.
    pub async fn insinuate(
        &self,
        entity: &LiveEntry,
        dest: &Registry,
        ctx: &OpCtx,
    ) -> HangarResult<LiveEntry> {
        let copy = crate::insinuate::copy_entry(entity.clone(), dest, ctx).await?;
        dest.resolve(ctx, &copy).await?.ok_or_else(|| {
            HangarError::storage(format!("insinuated copy {} vanished", copy))
        })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name.to_string())
            .field("categories", &self.categories.len())
            .finish()
    }
}
