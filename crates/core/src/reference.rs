//! Registry references
//!
//! A `RegRef` is a weak, serializable pointer to a stored entity. It names
//! the registry the entity lives in, because ids are only unique within a
//! `(registry, type)` pair. It is the form used for drag/drop payloads and
//! for reference fields inside raw records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity_type::EntityType;
use crate::error::HangarResult;
use crate::registry_name::RegistryName;

/// Weak pointer to a stored entity
///
/// Serialized as
/// `{"id": "...", "type": "mech", "registry_name": "world", "fallback_display_id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegRef {
    /// Storage id, unique within `(registry_name, entity_type)`
    pub id: String,
    /// Category of the target
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Registry hosting the target
    pub registry_name: RegistryName,
    /// Human-readable id shown when the target cannot be resolved
    #[serde(default)]
    pub fallback_display_id: String,
}

impl RegRef {
    /// Create a reference with an empty fallback id
    pub fn new(id: impl Into<String>, entity_type: EntityType, registry_name: RegistryName) -> Self {
        RegRef {
            id: id.into(),
            entity_type,
            registry_name,
            fallback_display_id: String::new(),
        }
    }

    /// Set the fallback display id (builder pattern)
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_display_id = fallback.into();
        self
    }

    /// Parse a reference out of a JSON value
    ///
    /// Anything that is not a well-formed reference (null, unknown type
    /// tag, unparsable registry name, missing id) yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value::<RegRef>(value.clone())
            .ok()
            .filter(|r| !r.id.is_empty())
    }

    /// Serialize into a JSON value
    pub fn to_json(&self) -> HangarResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Whether `other` points at the same entity (fallback id ignored)
    pub fn same_target(&self, other: &RegRef) -> bool {
        self.id == other.id
            && self.entity_type == other.entity_type
            && self.registry_name == other.registry_name
    }
}

impl fmt::Display for RegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.registry_name, self.entity_type, self.id)
    }
}
