//! Registry layer for Hangar
//!
//! This crate turns stored records into live entries and back:
//! - OpCtx: identity map scoping one resolve/insinuate call tree
//! - LiveEntry: a revived record bound to its physical document
//! - Category: one entity type bound to a collection wrapper
//! - Registry: one Category per entity type, reference resolution, CRUD
//! - RegistryFactory: builds registries by name and caches them
//! - Insinuation: structural copy of an entity into another registry
//!
//! # Example
//!
//! ```ignore
//! let factory = RegistryFactory::new(store, RegistryConfig::default());
//! let world = factory.world().await?;
//! let ctx = OpCtx::new();
//! let pilot = world.create_default(&ctx, EntityType::Pilot).await?;
//! let again = world.resolve(&ctx, &pilot.as_ref()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod config;
pub mod ctx;
pub mod entry;
pub mod factory;
mod insinuate;
pub mod registry;

use std::future::Future;
use std::pin::Pin;

pub use category::{check_record, Category, Defaulter, Reviver};
pub use config::{InsinuationConfig, RegistryConfig};
pub use ctx::{EntryKey, OpCtx};
pub use entry::{EntryState, LiveEntry};
pub use factory::RegistryFactory;
pub use registry::Registry;

/// Boxed future used where resolution recurses through registries
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
