//! Core types for Hangar
//!
//! This crate defines the vocabulary shared by every layer:
//! - EntityType: the closed set of entity categories and their record schema
//! - RegRef: serializable weak pointer to a stored entity
//! - RegistryName: tagged union naming a storage partition
//! - RawRecord / RecordPath: the stored representation of an entity
//! - HangarError: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity_type;
pub mod error;
pub mod id;
pub mod record;
pub mod reference;
pub mod registry_name;

pub use entity_type::{Cardinality, DocumentKind, EntityType, Ownership, RefField};
pub use error::{HangarError, HangarResult, WriteOutcome};
pub use id::new_id;
pub use record::{PathParseError, PathSegment, RawRecord, RecordPath};
pub use reference::RegRef;
pub use registry_name::RegistryName;
