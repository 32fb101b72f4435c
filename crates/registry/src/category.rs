//! Categories and revival
//!
//! A category binds one entity type to the wrapper that stores it, a
//! defaulter producing fresh records and a reviver that vets stored records.
//!
//! # Revival
//!
//! 1. A context hit for the key is returned unchanged.
//! 2. Otherwise the record is vetted, wrapped in a new entry and registered
//!    in the context before anything is awaited.
//! 3. Every reference field is then resolved through the registry in the
//!    same context. Unresolvable references become empty slots. On failure
//!    the entry is unregistered and the error propagates.

use std::sync::Arc;

use serde_json::Value;

use hangar_collections::CollectionWrapper;
use hangar_core::{
    Cardinality, EntityType, HangarError, HangarResult, RawRecord, RefField, RegRef,
};
use hangar_storage::Document;

use crate::ctx::{EntryKey, OpCtx};
use crate::entry::{EntryState, LiveEntry};
use crate::registry::Registry;

/// Produces the record of a freshly created entity
pub type Defaulter = fn(EntityType) -> RawRecord;

/// Vets a stored record before it is revived; `Err` carries the reason
pub type Reviver = fn(&Document) -> Result<(), String>;

/// Default reviver: the record is an object and every reference field has
/// the shape its schema declares
///
/// A single reference must be null or an object; a list must be an array
/// of nulls and objects. Objects that do not parse as a reference are not
/// errors; they resolve to nothing.
pub fn check_record(doc: &Document) -> Result<(), String> {
    if !doc.data.is_object() {
        return Err("record is not a JSON object".to_string());
    }
    for field in doc.entity_type.references() {
        let Some(value) = doc.data.get(&field.path()) else {
            continue;
        };
        match (field.cardinality, value) {
            (_, Value::Null) | (Cardinality::One, Value::Object(_)) => {}
            (Cardinality::Many, Value::Array(items)) => {
                if let Some(i) = items.iter().position(|v| !(v.is_null() || v.is_object())) {
                    return Err(format!("{}[{}] is not a reference", field.name(), i));
                }
            }
            (Cardinality::One, _) => {
                return Err(format!("{} is not a reference", field.name()));
            }
            (Cardinality::Many, _) => {
                return Err(format!("{} is not a list of references", field.name()));
            }
        }
    }
    Ok(())
}

/// References held by one field, in record order
fn field_refs(data: &RawRecord, field: &RefField) -> Vec<Option<RegRef>> {
    let value = data.get(&field.path());
    match field.cardinality {
        Cardinality::One => vec![value.and_then(RegRef::from_json)],
        Cardinality::Many => value
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RegRef::from_json).collect())
            .unwrap_or_default(),
    }
}

/// One entity type bound to its storage
#[derive(Clone)]
pub struct Category {
    entity_type: EntityType,
    wrapper: Arc<dyn CollectionWrapper>,
    defaulter: Defaulter,
    reviver: Reviver,
}

impl Category {
    /// Bind `wrapper` with the schema defaults and the default reviver
    pub fn new(wrapper: Arc<dyn CollectionWrapper>) -> Self {
        Self {
            entity_type: wrapper.entity_type(),
            wrapper,
            defaulter: EntityType::default_record,
            reviver: check_record,
        }
    }

    /// Replace the defaulter (builder pattern)
    pub fn with_defaulter(mut self, defaulter: Defaulter) -> Self {
        self.defaulter = defaulter;
        self
    }

    /// Replace the reviver (builder pattern)
    pub fn with_reviver(mut self, reviver: Reviver) -> Self {
        self.reviver = reviver;
        self
    }

    /// Bound entity type
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Backing wrapper
    pub fn wrapper(&self) -> &Arc<dyn CollectionWrapper> {
        &self.wrapper
    }

    /// A fresh record for this type
    pub fn default_record(&self) -> RawRecord {
        (self.defaulter)(self.entity_type)
    }

    /// Turn a stored document into the context's live entry for it
    pub async fn revive(&self, reg: &Registry, ctx: &OpCtx, doc: Document) -> HangarResult<LiveEntry> {
        let key = EntryKey::new(reg.name().clone(), self.entity_type, doc.id.clone());
        if let Some(hit) = ctx.get(&key) {
            tracing::trace!(target: "hangar::registry", key = ?key, "identity map hit");
            return Ok(hit);
        }

        (self.reviver)(&doc).map_err(|reason| HangarError::revival(self.entity_type, &doc.id, reason))?;

        let (entry, inserted) = ctx.get_or_insert(LiveEntry::new(
            key,
            ctx.id(),
            doc,
            self.wrapper.clone(),
        ));
        if !inserted {
            return Ok(entry);
        }

        tracing::debug!(
            target: "hangar::registry",
            registry = %reg.name(),
            entity_type = %self.entity_type,
            id = %entry.id(),
            "reviving"
        );
        match self.ready(reg, ctx, &entry).await {
            Ok(()) => {
                entry.set_state(EntryState::Ready);
                tracing::debug!(
                    target: "hangar::registry",
                    entity_type = %self.entity_type,
                    id = %entry.id(),
                    "revived"
                );
                Ok(entry)
            }
            Err(e) => {
                entry.set_state(EntryState::Failed);
                ctx.remove(&entry);
                Err(e)
            }
        }
    }

    /// Resolve every reference field of `entry`
    async fn ready(&self, reg: &Registry, ctx: &OpCtx, entry: &LiveEntry) -> HangarResult<()> {
        let data = entry.data();
        for field in self.entity_type.references() {
            let mut targets = Vec::new();
            for r in field_refs(&data, field) {
                let target = match r {
                    Some(r) => reg.resolve(ctx, &r).await?,
                    None => None,
                };
                targets.push(target);
            }
            entry.set_resolved(field.name(), &targets);
        }
        Ok(())
    }

    /// Store a default record and revive it
    pub async fn create_default(&self, reg: &Registry, ctx: &OpCtx) -> HangarResult<LiveEntry> {
        self.create_live(reg, ctx, self.default_record()).await
    }

    /// Store `raw` and revive it
    pub async fn create_live(
        &self,
        reg: &Registry,
        ctx: &OpCtx,
        raw: RawRecord,
    ) -> HangarResult<LiveEntry> {
        let doc = self.wrapper.create(raw).await?;
        self.revive(reg, ctx, doc).await
    }
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("entity_type", &self.entity_type)
            .field("backend", &self.wrapper.describe())
            .finish()
    }
}
