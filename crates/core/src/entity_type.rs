//! Entity type tags
//!
//! The closed set of categories an entity can belong to. Everything that
//! varies by category (which physical collection stores it, which record
//! fields are references, what a fresh record looks like) is decided here
//! with an exhaustive `match`, so a new tag does not compile until each of
//! those decisions is made.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::HangarError;
use crate::record::{RawRecord, RecordPath};

/// Category discriminator for stored entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Player character
    Pilot,
    /// A pilot's mech
    Mech,
    /// Non-player combatant
    Npc,
    /// Drone, turret or other deployed object
    Deployable,
    /// Mech chassis
    Frame,
    /// Weapon mounted on a mech
    MechWeapon,
    /// Mech system
    MechSystem,
    /// Modification attached to a mech weapon
    WeaponMod,
    /// Pilot core bonus
    CoreBonus,
    /// Pilot talent
    Talent,
    /// Pilot skill trigger
    Skill,
    /// Manufacturer license
    License,
    /// Pilot armor
    PilotArmor,
    /// Pilot sidearm
    PilotWeapon,
    /// Pilot gear
    PilotGear,
    /// Downtime reserve
    Reserve,
    /// NPC class
    NpcClass,
    /// NPC feature
    NpcFeature,
}

/// Physical document family an entity type is stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Top-level actor (has a token, owns an inventory)
    Actor,
    /// Item (top-level, embedded in an actor, or in a pack)
    Item,
}

/// Whether a reference field holds one ref or a list of refs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A single ref or null
    One,
    /// An array of refs
    Many,
}

/// Whether a reference is structural or a plain pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The referenced entity is part of this one; insinuation copies it
    Owned,
    /// Followed during revival, never copied
    Weak,
}

/// A record field that holds references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefField {
    /// Object keys leading to the field
    pub keys: &'static [&'static str],
    /// One or many
    pub cardinality: Cardinality,
    /// Owned or weak
    pub ownership: Ownership,
}

impl RefField {
    const fn owned_many(keys: &'static [&'static str]) -> Self {
        RefField {
            keys,
            cardinality: Cardinality::Many,
            ownership: Ownership::Owned,
        }
    }

    const fn owned_one(keys: &'static [&'static str]) -> Self {
        RefField {
            keys,
            cardinality: Cardinality::One,
            ownership: Ownership::Owned,
        }
    }

    const fn weak_many(keys: &'static [&'static str]) -> Self {
        RefField {
            keys,
            cardinality: Cardinality::Many,
            ownership: Ownership::Weak,
        }
    }

    const fn weak_one(keys: &'static [&'static str]) -> Self {
        RefField {
            keys,
            cardinality: Cardinality::One,
            ownership: Ownership::Weak,
        }
    }

    /// Path of the field inside a record
    pub fn path(&self) -> RecordPath {
        RecordPath::from_keys(self.keys)
    }

    /// Dotted name, used in logs and as the key of resolved fields
    pub fn name(&self) -> String {
        self.keys.join(".")
    }

    /// Whether insinuation copies the targets of this field
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }
}

const PILOT_REFS: &[RefField] = &[
    RefField::owned_many(&["skills"]),
    RefField::owned_many(&["talents"]),
    RefField::owned_many(&["core_bonuses"]),
    RefField::owned_many(&["licenses"]),
    RefField::owned_many(&["reserves"]),
    RefField::owned_many(&["loadout", "armor"]),
    RefField::owned_many(&["loadout", "weapons"]),
    RefField::owned_many(&["loadout", "gear"]),
    RefField::weak_many(&["mechs"]),
    RefField::weak_one(&["active_mech"]),
];

const MECH_REFS: &[RefField] = &[
    RefField::owned_one(&["frame"]),
    RefField::owned_many(&["loadout", "weapons"]),
    RefField::owned_many(&["loadout", "systems"]),
    RefField::weak_one(&["pilot"]),
];

const NPC_REFS: &[RefField] = &[
    RefField::owned_many(&["classes"]),
    RefField::owned_many(&["features"]),
];

const DEPLOYABLE_REFS: &[RefField] = &[RefField::weak_one(&["deployer"])];

const MECH_WEAPON_REFS: &[RefField] = &[RefField::owned_many(&["mods"])];

const NPC_CLASS_REFS: &[RefField] = &[RefField::owned_many(&["base_features"])];

impl EntityType {
    /// Every entity type
    pub const ALL: [EntityType; 18] = [
        EntityType::Pilot,
        EntityType::Mech,
        EntityType::Npc,
        EntityType::Deployable,
        EntityType::Frame,
        EntityType::MechWeapon,
        EntityType::MechSystem,
        EntityType::WeaponMod,
        EntityType::CoreBonus,
        EntityType::Talent,
        EntityType::Skill,
        EntityType::License,
        EntityType::PilotArmor,
        EntityType::PilotWeapon,
        EntityType::PilotGear,
        EntityType::Reserve,
        EntityType::NpcClass,
        EntityType::NpcFeature,
    ];

    /// Wire name of the tag
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Pilot => "pilot",
            EntityType::Mech => "mech",
            EntityType::Npc => "npc",
            EntityType::Deployable => "deployable",
            EntityType::Frame => "frame",
            EntityType::MechWeapon => "mech_weapon",
            EntityType::MechSystem => "mech_system",
            EntityType::WeaponMod => "weapon_mod",
            EntityType::CoreBonus => "core_bonus",
            EntityType::Talent => "talent",
            EntityType::Skill => "skill",
            EntityType::License => "license",
            EntityType::PilotArmor => "pilot_armor",
            EntityType::PilotWeapon => "pilot_weapon",
            EntityType::PilotGear => "pilot_gear",
            EntityType::Reserve => "reserve",
            EntityType::NpcClass => "npc_class",
            EntityType::NpcFeature => "npc_feature",
        }
    }

    /// Physical document family this type is stored as
    pub fn document_kind(self) -> DocumentKind {
        match self {
            EntityType::Pilot | EntityType::Mech | EntityType::Npc | EntityType::Deployable => {
                DocumentKind::Actor
            }
            EntityType::Frame
            | EntityType::MechWeapon
            | EntityType::MechSystem
            | EntityType::WeaponMod
            | EntityType::CoreBonus
            | EntityType::Talent
            | EntityType::Skill
            | EntityType::License
            | EntityType::PilotArmor
            | EntityType::PilotWeapon
            | EntityType::PilotGear
            | EntityType::Reserve
            | EntityType::NpcClass
            | EntityType::NpcFeature => DocumentKind::Item,
        }
    }

    /// Record fields of this type that hold references
    pub fn references(self) -> &'static [RefField] {
        match self {
            EntityType::Pilot => PILOT_REFS,
            EntityType::Mech => MECH_REFS,
            EntityType::Npc => NPC_REFS,
            EntityType::Deployable => DEPLOYABLE_REFS,
            EntityType::MechWeapon => MECH_WEAPON_REFS,
            EntityType::NpcClass => NPC_CLASS_REFS,
            EntityType::Frame
            | EntityType::MechSystem
            | EntityType::WeaponMod
            | EntityType::CoreBonus
            | EntityType::Talent
            | EntityType::Skill
            | EntityType::License
            | EntityType::PilotArmor
            | EntityType::PilotWeapon
            | EntityType::PilotGear
            | EntityType::Reserve
            | EntityType::NpcFeature => &[],
        }
    }

    /// A fully populated record for a freshly created entity of this type
    pub fn default_record(self) -> RawRecord {
        let value = match self {
            EntityType::Pilot => json!({
                "lid": "", "name": "New Pilot", "callsign": "", "level": 0,
                "hp": 6, "grit": 0,
                "skills": [], "talents": [], "core_bonuses": [], "licenses": [], "reserves": [],
                "loadout": { "armor": [], "weapons": [], "gear": [] },
                "mechs": [], "active_mech": null
            }),
            EntityType::Mech => json!({
                "lid": "", "name": "New Mech", "frame": null,
                "loadout": { "weapons": [], "systems": [] },
                "pilot": null,
                "hp": 0, "heat": 0, "structure": 4, "stress": 4, "overshield": 0
            }),
            EntityType::Npc => json!({
                "lid": "", "name": "New NPC", "tier": 1, "classes": [], "features": []
            }),
            EntityType::Deployable => json!({
                "lid": "", "name": "New Deployable", "deployer": null,
                "hp": 5, "evasion": 10, "edef": 10
            }),
            EntityType::Frame => json!({
                "lid": "", "name": "New Frame", "manufacturer": "GMS", "mechtype": [],
                "stats": {
                    "hp": 10, "evasion": 8, "edef": 8, "heatcap": 6, "sensor_range": 10,
                    "tech_attack": 0, "save": 10, "speed": 4, "sp": 6, "armor": 0, "size": 1
                },
                "core_system": { "name": "", "active_name": "" }
            }),
            EntityType::MechWeapon => json!({
                "lid": "", "name": "New Weapon", "mount": "Main", "weapon_type": "Rifle",
                "damage": [], "range": [], "tags": [], "mods": [],
                "loaded": true, "destroyed": false
            }),
            EntityType::MechSystem => json!({
                "lid": "", "name": "New System", "sp": 1, "tags": [], "uses": 0, "destroyed": false
            }),
            EntityType::WeaponMod => json!({
                "lid": "", "name": "New Mod", "sp": 1, "allowed_types": [], "added_tags": []
            }),
            EntityType::CoreBonus => json!({
                "lid": "", "name": "New Core Bonus", "source": "", "effect": ""
            }),
            EntityType::Talent => json!({
                "lid": "", "name": "New Talent", "curr_rank": 1, "ranks": []
            }),
            EntityType::Skill => json!({
                "lid": "", "name": "New Skill", "curr_rank": 1, "description": ""
            }),
            EntityType::License => json!({
                "lid": "", "name": "New License", "manufacturer": "", "curr_rank": 1
            }),
            EntityType::PilotArmor => json!({
                "lid": "", "name": "New Armor", "hp_bonus": 0, "tags": []
            }),
            EntityType::PilotWeapon => json!({
                "lid": "", "name": "New Sidearm", "range": [], "damage": [], "tags": [], "loaded": true
            }),
            EntityType::PilotGear => json!({
                "lid": "", "name": "New Gear", "uses": 0, "tags": []
            }),
            EntityType::Reserve => json!({
                "lid": "", "name": "New Reserve", "type": "Resource", "consumable": false, "used": false
            }),
            EntityType::NpcClass => json!({
                "lid": "", "name": "New Class", "role": "striker", "base_features": []
            }),
            EntityType::NpcFeature => json!({
                "lid": "", "name": "New Feature", "origin": "", "effect": ""
            }),
        };
        RawRecord::from_value(value)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = HangarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| HangarError::serialization(format!("unknown entity type '{}'", s)))
    }
}
