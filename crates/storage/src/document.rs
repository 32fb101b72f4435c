//! Physical documents and collection addressing

use std::fmt;

use serde::{Deserialize, Serialize};

use hangar_core::{DocumentKind, EntityType, RawRecord};

/// Display metadata of a token placed on the map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// Name shown on the token
    pub name: String,
    /// Token image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// Metadata owned by the physical document rather than the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Document name
    pub name: String,
    /// Portrait / icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Prototype token (actors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenMeta>,
}

impl DocumentMeta {
    /// Metadata carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        DocumentMeta {
            name: name.into(),
            img: None,
            token: None,
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Storage id, assigned by the store
    pub id: String,
    /// Entity type of the record
    pub entity_type: EntityType,
    /// Document metadata
    pub meta: DocumentMeta,
    /// The raw record
    pub data: RawRecord,
    /// Store-wide write counter at the last write
    pub version: u64,
    /// Creation order within the store
    pub sort: u64,
    /// Unix timestamp of the last write
    pub modified: i64,
}

impl Document {
    /// Physical document family
    pub fn kind(&self) -> DocumentKind {
        self.entity_type.document_kind()
    }
}

/// Input to `DocumentStore::create`
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Entity type of the record
    pub entity_type: EntityType,
    /// Document metadata
    pub meta: DocumentMeta,
    /// The raw record
    pub data: RawRecord,
}

impl NewDocument {
    /// New document whose name is taken from the record
    pub fn from_record(entity_type: EntityType, data: RawRecord) -> Self {
        let name = data
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| entity_type.to_string());
        NewDocument {
            entity_type,
            meta: DocumentMeta::named(name),
            data,
        }
    }
}

/// Owner of an embedded collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parent {
    /// Pack holding the owner, or `None` for a top-level actor
    pub pack: Option<String>,
    /// Owner actor id
    pub actor_id: String,
}

impl Parent {
    /// A top-level actor
    pub fn world(actor_id: impl Into<String>) -> Self {
        Parent {
            pack: None,
            actor_id: actor_id.into(),
        }
    }

    /// An actor stored in a content pack
    pub fn in_pack(pack: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Parent {
            pack: Some(pack.into()),
            actor_id: actor_id.into(),
        }
    }

    /// Collection the owner actor itself lives in
    pub fn collection(&self) -> CollectionKey {
        match &self.pack {
            Some(pack) => CollectionKey::pack(pack.clone(), DocumentKind::Actor),
            None => CollectionKey::world(DocumentKind::Actor),
        }
    }
}

/// Where a collection lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// Top-level world documents
    World,
    /// Contents of one content pack
    Pack(String),
    /// Items embedded in one actor
    Embedded(Parent),
}

/// Address of one collection in a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionKey {
    /// Where the collection lives
    pub scope: Scope,
    /// Which document family it holds
    pub kind: DocumentKind,
}

impl CollectionKey {
    /// Top-level world collection
    pub fn world(kind: DocumentKind) -> Self {
        CollectionKey {
            scope: Scope::World,
            kind,
        }
    }

    /// Contents of a pack
    pub fn pack(pack: impl Into<String>, kind: DocumentKind) -> Self {
        CollectionKey {
            scope: Scope::Pack(pack.into()),
            kind,
        }
    }

    /// Items embedded in an actor
    pub fn embedded(parent: Parent) -> Self {
        CollectionKey {
            scope: Scope::Embedded(parent),
            kind: DocumentKind::Item,
        }
    }

    /// Pack that governs writes to this collection, if any
    ///
    /// Items embedded in a pack actor are governed by that actor's pack.
    pub fn pack_id(&self) -> Option<&str> {
        match &self.scope {
            Scope::World => None,
            Scope::Pack(pack) => Some(pack),
            Scope::Embedded(parent) => parent.pack.as_deref(),
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DocumentKind::Actor => "actors",
            DocumentKind::Item => "items",
        };
        match &self.scope {
            Scope::World => write!(f, "world/{}", kind),
            Scope::Pack(pack) => write!(f, "pack:{}/{}", pack, kind),
            Scope::Embedded(Parent { pack: None, actor_id }) => {
                write!(f, "actor:{}/{}", actor_id, kind)
            }
            Scope::Embedded(Parent {
                pack: Some(pack),
                actor_id,
            }) => write!(f, "pack:{}/actor:{}/{}", pack, actor_id, kind),
        }
    }
}

/// Controls whether a content pack accepts writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Allow both reads and writes (default)
    #[default]
    ReadWrite,
    /// Locked pack: every write fails with `ReadOnly`
    ReadOnly,
}

/// Description of a content pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    /// Pack id, e.g. `world.frame`
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Document family stored in the pack
    pub kind: DocumentKind,
    /// Lock state
    pub access: AccessMode,
    /// Bumped on every write to the pack or to items embedded in its actors
    pub version: u64,
}

impl PackInfo {
    /// Unlocked pack at version 0
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: DocumentKind) -> Self {
        PackInfo {
            id: id.into(),
            label: label.into(),
            kind,
            access: AccessMode::ReadWrite,
            version: 0,
        }
    }

    /// Whether writes are rejected
    pub fn is_locked(&self) -> bool {
        self.access == AccessMode::ReadOnly
    }
}
