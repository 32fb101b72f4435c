//! Registry factory and cache
//!
//! Builds registries by name and memoizes them. The factory is owned by the
//! application context rather than living in global state, so independent
//! instances (tests, multiple stores) never share a cache.
//!
//! | Name | Item types | Actor types |
//! |------|------------|-------------|
//! | `world` | world items | world actors |
//! | `compendium` | compendium | compendium |
//! | `world-actor:<id>` | inventory of world actor `id` | world actors |
//! | `compendium-actor:<id>` | inventory of pack actor `id` | compendium |
//! | `actor:<id>` | `world-actor:<id>`, else `compendium-actor:<id>` | |
//!
//! Compendium wrappers are shared by every registry the factory builds, so
//! all of them see one cache per type.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use hangar_collections::{
    CollectionWrapper, CompendiumWrapper, InventoryWrapper, WorldActors, WorldItems,
};
use hangar_core::{DocumentKind, EntityType, HangarError, HangarResult, RegistryName};
use hangar_storage::{CollectionKey, DocumentStore, Parent};

use crate::category::Category;
use crate::config::RegistryConfig;
use crate::registry::Registry;

/// Builds and caches registries
pub struct RegistryFactory {
    store: Arc<dyn DocumentStore>,
    config: RegistryConfig,
    cache: DashMap<RegistryName, Arc<Registry>>,
    compendium: FxHashMap<EntityType, Arc<CompendiumWrapper>>,
    me: Weak<RegistryFactory>,
}

impl RegistryFactory {
    /// Create a factory over `store`
    pub fn new(store: Arc<dyn DocumentStore>, config: RegistryConfig) -> Arc<Self> {
        let compendium = EntityType::ALL
            .iter()
            .map(|&ty| {
                let wrapper = CompendiumWrapper::new(store.clone(), ty, config.compendium.clone());
                (ty, Arc::new(wrapper))
            })
            .collect();
        Arc::new_cyclic(|me| Self {
            store,
            config,
            cache: DashMap::new(),
            compendium,
            me: me.clone(),
        })
    }

    /// Settings the factory was built with
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The world registry
    pub async fn world(&self) -> HangarResult<Arc<Registry>> {
        self.switch(&RegistryName::World)
            .await?
            .ok_or_else(|| HangarError::BackendUnavailable {
                name: RegistryName::World.to_string(),
            })
    }

    /// The compendium registry
    pub async fn compendium(&self) -> HangarResult<Arc<Registry>> {
        self.switch(&RegistryName::Compendium)
            .await?
            .ok_or_else(|| HangarError::BackendUnavailable {
                name: RegistryName::Compendium.to_string(),
            })
    }

    /// Registry for `name`, from the cache or freshly built
    ///
    /// Returns `None` when the backend is unavailable, i.e. the owner actor
    /// of an actor-scoped name does not exist.
    pub async fn switch(&self, name: &RegistryName) -> HangarResult<Option<Arc<Registry>>> {
        if let Some(hit) = self.cached(name) {
            tracing::trace!(target: "hangar::registry", registry = %name, "registry cache hit");
            return Ok(Some(hit));
        }

        let built = match name {
            RegistryName::World => Some(self.build(RegistryName::World, None)),
            RegistryName::Compendium => Some(self.build(RegistryName::Compendium, None)),
            RegistryName::WorldActor(id) => self.world_actor(id).await?,
            RegistryName::CompendiumActor(id) => self.compendium_actor(id).await?,
            RegistryName::Actor(id) => {
                let world = RegistryName::WorldActor(id.clone());
                let pack = RegistryName::CompendiumActor(id.clone());
                match self.cached(&world).or_else(|| self.cached(&pack)) {
                    Some(hit) => Some(hit),
                    None => match self.world_actor(id).await? {
                        Some(reg) => Some(reg),
                        None => self.compendium_actor(id).await?,
                    },
                }
            }
        };

        let Some(registry) = built else {
            tracing::debug!(target: "hangar::registry", registry = %name, "registry unavailable");
            return Ok(None);
        };
        Ok(Some(self.remember(name, registry)))
    }

    /// Cached registry for `name`, if caching is on
    pub fn cached(&self, name: &RegistryName) -> Option<Arc<Registry>> {
        if !self.config.cache_registries {
            return None;
        }
        self.cache.get(name).map(|r| r.value().clone())
    }

    /// Evict one name; `true` if it was cached
    pub fn forget(&self, name: &RegistryName) -> bool {
        let removed = self.cache.remove(name).is_some();
        if let RegistryName::Actor(id) = name {
            self.cache.remove(&RegistryName::WorldActor(id.clone()));
            self.cache.remove(&RegistryName::CompendiumActor(id.clone()));
        }
        if let Some(id) = name.owner_id() {
            self.cache.remove(&RegistryName::Actor(id.to_string()));
        }
        removed
    }

    /// Evict every cached registry and drop compendium caches
    pub fn clear(&self) {
        self.cache.clear();
        for wrapper in self.compendium.values() {
            wrapper.invalidate();
        }
    }

    /// Number of cached names
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Cache `registry` under its canonical name and under `requested`
    ///
    /// If another task cached the same name first, that instance wins.
    fn remember(&self, requested: &RegistryName, registry: Arc<Registry>) -> Arc<Registry> {
        if !self.config.cache_registries {
            return registry;
        }
        let registry = self
            .cache
            .entry(registry.name().clone())
            .or_insert(registry)
            .value()
            .clone();
        if requested != registry.name() {
            self.cache.insert(requested.clone(), registry.clone());
        }
        tracing::debug!(
            target: "hangar::registry",
            requested = %requested,
            registry = %registry.name(),
            "registry cached"
        );
        registry
    }

    async fn world_actor(&self, id: &str) -> HangarResult<Option<Arc<Registry>>> {
        let owner = self
            .store
            .get(&CollectionKey::world(DocumentKind::Actor), id)
            .await?;
        if owner.is_none() {
            return Ok(None);
        }
        let name = RegistryName::WorldActor(id.to_string());
        Ok(Some(self.build(name, Some(Parent::world(id)))))
    }

    /// Linear scan of actor packs for the owner
    async fn compendium_actor(&self, id: &str) -> HangarResult<Option<Arc<Registry>>> {
        for pack in self.store.packs().await? {
            if pack.kind != DocumentKind::Actor {
                continue;
            }
            let coll = CollectionKey::pack(pack.id.clone(), DocumentKind::Actor);
            if self.store.get(&coll, id).await?.is_some() {
                let name = RegistryName::CompendiumActor(id.to_string());
                return Ok(Some(self.build(name, Some(Parent::in_pack(pack.id, id)))));
            }
        }
        Ok(None)
    }

    /// Assemble a registry; `owner` is set for actor-scoped names
    fn build(&self, name: RegistryName, owner: Option<Parent>) -> Arc<Registry> {
        let categories: Vec<Category> = EntityType::ALL
            .iter()
            .map(|&ty| Category::new(self.wrapper_for(&name, owner.as_ref(), ty)))
            .collect();

        tracing::debug!(target: "hangar::registry", registry = %name, "building registry");
        Arc::new(Registry::new(
            name,
            categories,
            self.me.clone(),
            self.config.insinuation.copy_metadata,
        ))
    }

    fn wrapper_for(
        &self,
        name: &RegistryName,
        owner: Option<&Parent>,
        ty: EntityType,
    ) -> Arc<dyn CollectionWrapper> {
        let compendium_backed = match ty.document_kind() {
            DocumentKind::Item => *name == RegistryName::Compendium,
            DocumentKind::Actor => name.is_compendium_backed(),
        };
        if compendium_backed {
            return self.compendium_wrapper(ty);
        }
        match (ty.document_kind(), owner) {
            (DocumentKind::Item, Some(parent)) => {
                Arc::new(InventoryWrapper::new(self.store.clone(), parent.clone(), ty))
            }
            (DocumentKind::Item, None) => Arc::new(WorldItems::new(self.store.clone(), ty)),
            (DocumentKind::Actor, _) => Arc::new(WorldActors::new(self.store.clone(), ty)),
        }
    }

    fn compendium_wrapper(&self, ty: EntityType) -> Arc<dyn CollectionWrapper> {
        self.compendium.get(&ty).cloned().unwrap_or_else(|| {
            Arc::new(CompendiumWrapper::new(
                self.store.clone(),
                ty,
                self.config.compendium.clone(),
            ))
        })
    }
}

impl std::fmt::Debug for RegistryFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryFactory")
            .field("cached", &self.cached_count())
            .field("config", &self.config)
            .finish()
    }
}
