//! Hangar: entity registry for a mech-combat rules engine
//!
//! Stores pilots, mechs, frames, weapons and the rest across several
//! backends behind one registry interface, revives stored records into live
//! entries scoped to an operation context, and copies entities with
//! everything they own from one registry into another.
//!
//! # Example
//!
//! ```ignore
//! use hangar::{Hangar, EntityType, OpCtx};
//!
//! let hangar = Hangar::in_memory();
//! let world = hangar.world().await?;
//! let ctx = hangar.new_ctx();
//!
//! let pilot = world.create_default(&ctx, EntityType::Pilot).await?;
//! let copy = world.insinuate(&pilot, &hangar.compendium().await?, &ctx).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod types;

use std::sync::Arc;

pub use types::*;

/// Application context: one store and the registry factory over it
///
/// Clone is cheap; clones share the store and the registry cache.
#[derive(Clone)]
pub struct Hangar {
    store: Arc<dyn DocumentStore>,
    factory: Arc<RegistryFactory>,
}

impl Hangar {
    /// Context over `store` with default settings
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, RegistryConfig::default())
    }

    /// Context over `store` with explicit settings
    pub fn with_config(store: Arc<dyn DocumentStore>, config: RegistryConfig) -> Self {
        tracing::debug!(
            target: "hangar::registry",
            cache_registries = config.cache_registries,
            "hangar context created"
        );
        let factory = RegistryFactory::new(store.clone(), config);
        Self { store, factory }
    }

    /// Context over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Registry factory and cache
    pub fn registries(&self) -> &Arc<RegistryFactory> {
        &self.factory
    }

    /// The world registry
    pub async fn world(&self) -> HangarResult<Arc<Registry>> {
        self.factory.world().await
    }

    /// The compendium registry
    pub async fn compendium(&self) -> HangarResult<Arc<Registry>> {
        self.factory.compendium().await
    }

    /// Registry by name; `None` if its backend is unavailable
    pub async fn switch(&self, name: &RegistryName) -> HangarResult<Option<Arc<Registry>>> {
        self.factory.switch(name).await
    }

    /// Fresh operation context
    pub fn new_ctx(&self) -> OpCtx {
        OpCtx::new()
    }

    /// Resolve a reference from anywhere
    ///
    /// Starts from the world registry and switches to the one the reference
    /// names.
    pub async fn resolve(&self, ctx: &OpCtx, r: &RegRef) -> HangarResult<Option<LiveEntry>> {
        let world = self.world().await?;
        world.resolve(ctx, r).await
    }
}

impl std::fmt::Debug for Hangar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hangar")
            .field("registries", &self.factory)
            .finish()
    }
}
