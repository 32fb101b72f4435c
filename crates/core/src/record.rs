//! Raw records and record paths
//!
//! A raw record is the stored representation of an entity: a JSON object
//! matching its type's schema. This module defines:
//! - RawRecord: newtype wrapper around serde_json::Value
//! - RecordPath: path into a record (e.g. "loadout.weapons" or "mods[0]")
//! - PathSegment: individual path component (Key or Index)

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{HangarError, HangarResult};

/// Stored representation of an entity
///
/// Newtype around serde_json::Value. Derefs to the inner value so the
/// usual `as_object`, `get` and indexing helpers are available directly.
///
/// # Examples
///
/// ```
/// use hangar_core::{RawRecord, RecordPath};
///
/// let mut record: RawRecord = r#"{"name": "Everest", "stats": {"hp": 10}}"#.parse().unwrap();
/// let hp: RecordPath = "stats.hp".parse().unwrap();
/// assert_eq!(record.get(&hp).and_then(|v| v.as_i64()), Some(10));
///
/// record.set(&hp, 12.into()).unwrap();
/// assert_eq!(record["stats"]["hp"].as_i64(), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    /// An empty JSON object
    pub fn object() -> Self {
        RawRecord(Value::Object(Map::new()))
    }

    /// Wrap a serde_json::Value
    pub fn from_value(value: Value) -> Self {
        RawRecord(value)
    }

    /// Unwrap into the underlying serde_json::Value
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Borrow the underlying serde_json::Value
    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    /// Human-readable id (`lid`), if the record carries a non-empty one
    pub fn lid(&self) -> Option<&str> {
        self.0
            .get("lid")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Display name, if present
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Id shown when the record itself cannot be reached: lid, then name
    pub fn display_id(&self) -> String {
        self.lid()
            .or_else(|| self.name())
            .unwrap_or_default()
            .to_string()
    }

    /// Value at `path`, if every segment exists
    pub fn get(&self, path: &RecordPath) -> Option<&Value> {
        let mut cur = &self.0;
        for seg in path.segments() {
            cur = match seg {
                PathSegment::Key(k) => cur.as_object()?.get(k)?,
                PathSegment::Index(i) => cur.as_array()?.get(*i)?,
            };
        }
        Some(cur)
    }

    /// Write `value` at `path`
    ///
    /// Missing object keys along the way are created as empty objects.
    /// Array indices must already exist.
    pub fn set(&mut self, path: &RecordPath, value: Value) -> HangarResult<()> {
        let Some((last, parents)) = path.segments().split_last() else {
            self.0 = value;
            return Ok(());
        };

        let mut cur = &mut self.0;
        for seg in parents {
            cur = match seg {
                PathSegment::Key(k) => cur
                    .as_object_mut()
                    .ok_or_else(|| path_error(path, "parent is not an object"))?
                    .entry(k.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                PathSegment::Index(i) => cur
                    .as_array_mut()
                    .ok_or_else(|| path_error(path, "parent is not an array"))?
                    .get_mut(*i)
                    .ok_or_else(|| path_error(path, "index out of bounds"))?,
            };
        }

        match last {
            PathSegment::Key(k) => {
                cur.as_object_mut()
                    .ok_or_else(|| path_error(path, "parent is not an object"))?
                    .insert(k.clone(), value);
            }
            PathSegment::Index(i) => {
                let slot = cur
                    .as_array_mut()
                    .ok_or_else(|| path_error(path, "parent is not an array"))?
                    .get_mut(*i)
                    .ok_or_else(|| path_error(path, "index out of bounds"))?;
                *slot = value;
            }
        }
        Ok(())
    }

    /// Overlay this record onto `defaults`
    ///
    /// Objects merge key by key; any other value in `self` replaces the
    /// default. Keys present only in `defaults` are filled in.
    pub fn populated_from(&self, defaults: &RawRecord) -> RawRecord {
        let mut out = defaults.0.clone();
        overlay(&mut out, &self.0);
        RawRecord(out)
    }

    /// Serialize to a compact JSON string
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

fn overlay(base: &mut Value, top: &Value) {
    match (base, top) {
        (Value::Object(base), Value::Object(top)) => {
            for (k, v) in top {
                match base.get_mut(k) {
                    Some(existing) => overlay(existing, v),
                    None => {
                        base.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (base, top) => *base = top.clone(),
    }
}

fn path_error(path: &RecordPath, reason: &str) -> HangarError {
    HangarError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for RawRecord {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(RawRecord)
    }
}

impl Deref for RawRecord {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RawRecord {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Default is an empty object, not null: records are always objects
impl Default for RawRecord {
    fn default() -> Self {
        Self::object()
    }
}

impl From<Value> for RawRecord {
    fn from(v: Value) -> Self {
        RawRecord(v)
    }
}

impl From<RawRecord> for Value {
    fn from(v: RawRecord) -> Self {
        v.0
    }
}

// =============================================================================
// RecordPath and PathSegment
// =============================================================================

/// Error type for record path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// A segment in a record path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`
    Index(usize),
}

/// A path into a record
///
/// | Syntax | Meaning | Example |
/// |--------|---------|---------|
/// | `key` | Object property | `frame` |
/// | `a.b` | Nested property | `loadout.weapons` |
/// | `key[n]` | Property then index | `mods[0]` |
/// | (empty) | Root | `` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct RecordPath {
    segments: Vec<PathSegment>,
}

impl RecordPath {
    /// The root path
    pub fn root() -> Self {
        RecordPath {
            segments: Vec::new(),
        }
    }

    /// A path made only of object keys
    pub fn from_keys(keys: &[&str]) -> Self {
        RecordPath {
            segments: keys
                .iter()
                .map(|k| PathSegment::Key((*k).to_string()))
                .collect(),
        }
    }

    /// Path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl FromStr for RecordPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, mut pos) = match s.strip_prefix('.') {
            Some(rest) => (rest, 1),
            None => (s, 0),
        };
        if body.is_empty() {
            return Ok(RecordPath::root());
        }

        let mut segments = Vec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(PathParseError::EmptyKey(pos));
            }
            let split = part.find('[').unwrap_or(part.len());
            let (key, mut rest) = part.split_at(split);
            if let Some((i, c)) = key.char_indices().find(|(_, c)| !is_key_char(*c)) {
                return Err(PathParseError::UnexpectedChar(c, pos + i));
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }

            let mut offset = pos + key.len();
            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    let c = rest.chars().next().unwrap_or('?');
                    return Err(PathParseError::UnexpectedChar(c, offset));
                }
                let close = rest
                    .find(']')
                    .ok_or(PathParseError::UnclosedBracket(offset))?;
                let idx_str = &rest[1..close];
                let idx = idx_str
                    .parse::<usize>()
                    .map_err(|_| PathParseError::InvalidIndex(offset + 1, idx_str.to_string()))?;
                segments.push(PathSegment::Index(idx));
                rest = &rest[close + 1..];
                offset += close + 1;
            }
            pos += part.len() + 1;
        }

        Ok(RecordPath { segments })
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if i == 0 => write!(f, "{}", k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn path(s: &str) -> RecordPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_is_empty_object() {
        let r = RawRecord::default();
        assert!(r.is_object());
        assert_eq!(r.as_object().unwrap().len(), 0);
    }

    #[test]
    fn test_parse_record() {
        let r: RawRecord = r#"{"name": "Blackbeard", "lid": "mf_blackbeard"}"#.parse().unwrap();
        assert_eq!(r.name(), Some("Blackbeard"));
        assert_eq!(r.lid(), Some("mf_blackbeard"));
        assert_eq!(r.display_id(), "mf_blackbeard");
    }

    #[test]
    fn test_display_id_falls_back_to_name() {
        let r = RawRecord::from_value(json!({"lid": "", "name": "Custom Frame"}));
        assert_eq!(r.lid(), None);
        assert_eq!(r.display_id(), "Custom Frame");
        assert_eq!(RawRecord::object().display_id(), "");
    }

    #[test]
    fn test_get_nested_and_indexed() {
        let r = RawRecord::from_value(json!({"loadout": {"weapons": [{"id": "w1"}]}}));
        assert_eq!(
            r.get(&path("loadout.weapons[0].id")),
            Some(&json!("w1"))
        );
        assert!(r.get(&path("loadout.systems")).is_none());
        assert!(r.get(&path("loadout.weapons[3]")).is_none());
        assert_eq!(r.get(&RecordPath::root()), Some(r.as_inner()));
    }

    #[test]
    fn test_set_creates_missing_objects() {
        let mut r = RawRecord::object();
        r.set(&path("stats.hp"), json!(12)).unwrap();
        assert_eq!(r["stats"]["hp"], json!(12));
    }

    #[test]
    fn test_set_array_element() {
        let mut r = RawRecord::from_value(json!({"mods": ["a", "b"]}));
        r.set(&path("mods[1]"), json!("c")).unwrap();
        assert_eq!(r["mods"], json!(["a", "c"]));
    }

    #[test]
    fn test_set_out_of_bounds_fails() {
        let mut r = RawRecord::from_value(json!({"mods": []}));
        let err = r.set(&path("mods[0]"), json!("x")).unwrap_err();
        assert!(matches!(err, HangarError::InvalidPath { .. }));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut r = RawRecord::from_value(json!({"name": "x"}));
        assert!(r.set(&path("name.first"), json!("y")).is_err());
    }

    #[test]
    fn test_populated_from_fills_missing_keys() {
        let defaults = RawRecord::from_value(json!({
            "name": "New Mech", "hp": 0,
            "loadout": {"weapons": [], "systems": []}
        }));
        let partial = RawRecord::from_value(json!({
            "name": "Atlas", "loadout": {"weapons": ["w"]}
        }));
        let full = partial.populated_from(&defaults);
        assert_eq!(
            full.into_inner(),
            json!({"name": "Atlas", "hp": 0, "loadout": {"weapons": ["w"], "systems": []}})
        );
    }

    #[test]
    fn test_path_parse_forms() {
        assert_eq!(path(""), RecordPath::root());
        assert_eq!(path("frame"), RecordPath::root().key("frame"));
        assert_eq!(path(".frame"), RecordPath::root().key("frame"));
        assert_eq!(
            path("loadout.weapons[2].mods"),
            RecordPath::root()
                .key("loadout")
                .key("weapons")
                .index(2)
                .key("mods")
        );
        assert_eq!(path("[0][1]"), RecordPath::root().index(0).index(1));
    }

    #[test]
    fn test_path_parse_errors() {
        assert!(matches!(
            "a..b".parse::<RecordPath>(),
            Err(PathParseError::EmptyKey(2))
        ));
        assert!(matches!(
            "a.".parse::<RecordPath>(),
            Err(PathParseError::EmptyKey(_))
        ));
        assert!(matches!(
            "items[0".parse::<RecordPath>(),
            Err(PathParseError::UnclosedBracket(5))
        ));
        assert!(matches!(
            "items[x]".parse::<RecordPath>(),
            Err(PathParseError::InvalidIndex(6, _))
        ));
        assert!(matches!(
            "a b".parse::<RecordPath>(),
            Err(PathParseError::UnexpectedChar(' ', 1))
        ));
        assert!(matches!(
            "a[0]b".parse::<RecordPath>(),
            Err(PathParseError::UnexpectedChar('b', 4))
        ));
    }

    #[test]
    fn test_from_keys_matches_parse() {
        assert_eq!(
            RecordPath::from_keys(&["loadout", "armor"]),
            path("loadout.armor")
        );
    }

    fn segment() -> impl Strategy<Value = PathSegment> {
        prop_oneof![
            "[a-z_][a-z0-9_-]{0,8}".prop_map(PathSegment::Key),
            (0usize..64).prop_map(PathSegment::Index),
        ]
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(segments in prop::collection::vec(segment(), 0..6)) {
            let p = RecordPath { segments };
            let reparsed: RecordPath = p.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, p);
        }
    }
}
