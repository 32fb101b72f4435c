//! Registry names
//!
//! A registry name identifies one storage partition (backend + owner).
//! On the wire it is a short string (`world`, `world-actor:<id>`, ...);
//! in memory it is a tagged union so every consumer dispatches
//! exhaustively over the fixed backend kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HangarError;

/// Name of a storage partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegistryName {
    /// Global top-level items and actors
    World,
    /// Content packs (cross-pack, read-mostly)
    Compendium,
    /// Embedded inventory of one top-level actor
    WorldActor(String),
    /// Embedded inventory of one actor stored in a content pack
    CompendiumActor(String),
    /// Either of the above: world first, then compendium
    Actor(String),
}

impl RegistryName {
    /// Owning actor id, for actor-scoped names
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            RegistryName::World | RegistryName::Compendium => None,
            RegistryName::WorldActor(id)
            | RegistryName::CompendiumActor(id)
            | RegistryName::Actor(id) => Some(id),
        }
    }

    /// Whether this name can be a registry's own name
    ///
    /// The ambiguous `actor:` form only ever appears in requests; a built
    /// registry always knows which backend it landed on.
    pub fn is_canonical(&self) -> bool {
        !matches!(self, RegistryName::Actor(_))
    }

    /// Whether this registry is backed by content packs
    pub fn is_compendium_backed(&self) -> bool {
        matches!(
            self,
            RegistryName::Compendium | RegistryName::CompendiumActor(_)
        )
    }
}

impl fmt::Display for RegistryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryName::World => f.write_str("world"),
            RegistryName::Compendium => f.write_str("compendium"),
            RegistryName::WorldActor(id) => write!(f, "world-actor:{}", id),
            RegistryName::CompendiumActor(id) => write!(f, "compendium-actor:{}", id),
            RegistryName::Actor(id) => write!(f, "actor:{}", id),
        }
    }
}

impl FromStr for RegistryName {
    type Err = HangarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HangarError::InvalidRegistryName(s.to_string());
        let Some((kind, owner)) = s.split_once(':') else {
            return match s {
                "world" => Ok(RegistryName::World),
                "compendium" => Ok(RegistryName::Compendium),
                _ => Err(invalid()),
            };
        };
        if owner.is_empty() || owner.contains(':') {
            return Err(invalid());
        }
        let owner = owner.to_string();
        match kind {
            "world-actor" => Ok(RegistryName::WorldActor(owner)),
            "compendium-actor" => Ok(RegistryName::CompendiumActor(owner)),
            "actor" => Ok(RegistryName::Actor(owner)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for RegistryName {
    type Error = HangarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RegistryName> for String {
    fn from(name: RegistryName) -> Self {
        name.to_string()
    }
}
