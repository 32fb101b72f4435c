//! Public types for the Hangar API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Public API types - these are what users should use
// ============================================================================

// Entity vocabulary
pub use hangar_core::{Cardinality, DocumentKind, EntityType, Ownership, RefField};

// References and registry names
pub use hangar_core::{RegRef, RegistryName};

// Records
pub use hangar_core::{RawRecord, RecordPath};

// Errors and write outcomes
pub use hangar_core::{HangarError, HangarResult, WriteOutcome};

// Documents, packs and the store contract
pub use hangar_storage::{
    AccessMode, CollectionKey, Document, DocumentMeta, DocumentStore, MemoryStore, NewDocument,
    PackInfo, Parent, TokenMeta,
};

// Registry layer
pub use hangar_registry::{
    EntryState, InsinuationConfig, LiveEntry, OpCtx, Registry, RegistryConfig, RegistryFactory,
};

// Compendium settings
pub use hangar_collections::CompendiumConfig;
