//! Insinuation: cross-registry structural copy
//!
//! The copy is built top-down. The parent record is created first with its
//! owned reference fields emptied, which allocates its fresh id and lets
//! the context record `source → copy` before any child is visited. Children
//! are then copied through the references resolved at revival, and the
//! parent record is rewritten to point at the copies. Weak references are
//! carried over untouched.
//!
//! If anything after the shell is created fails, the shell is destroyed and
//! its record removed from the context before the error is returned.

use serde_json::Value;

use hangar_core::{
    Cardinality, DocumentKind, HangarError, HangarResult, RawRecord, RecordPath, RegRef,
    RegistryName,
};
use hangar_collections::CollectionWrapper;
use hangar_storage::DocumentMeta;

use crate::ctx::{EntryKey, OpCtx};
use crate::entry::LiveEntry;
use crate::registry::Registry;
use crate::BoxFuture;

/// Copy `entry` and its owned closure into `dest`, returning a reference to
/// the copy
pub(crate) fn copy_entry<'a>(
    entry: LiveEntry,
    dest: &'a Registry,
    ctx: &'a OpCtx,
) -> BoxFuture<'a, HangarResult<RegRef>> {
    Box::pin(async move {
        if !ctx.owns(&entry) {
            return Err(HangarError::ContextMismatch {
                id: entry.id().to_string(),
            });
        }
        if let Some(copy) = ctx.insinuated(entry.key(), dest.name()) {
            return Ok(copy);
        }

        let ty = entry.entity_type();
        let category = dest.category(ty).ok_or_else(|| {
            HangarError::storage(format!("registry '{}' has no category for {}", dest.name(), ty))
        })?;
        let owned: Vec<_> = ty.references().iter().filter(|f| f.is_owned()).collect();

        let source = entry.data();
        let mut shell = source.clone();
        for field in &owned {
            shell.set(&field.path(), empty_slot(field.cardinality))?;
        }
        let created = category.wrapper().create(shell).await?;
        let copy = RegRef::new(created.id.clone(), ty, dest.name().clone())
            .with_fallback(created.data.display_id());
        ctx.record_insinuation(entry.key().clone(), dest.name().clone(), copy.clone());

        let finished: HangarResult<()> = async {
            let mut record: RawRecord = created.data;
            for field in &owned {
                let mut linked = Vec::new();
                for (i, child) in entry.resolved(&field.name()).into_iter().enumerate() {
                    match child {
                        Some(child) => {
                            linked.push(copy_entry(child, dest, ctx).await?.to_json()?)
                        }
                        None => {
                            let slot = raw_slot(&source, field.path(), field.cardinality, i);
                            if let Some(value) = slot {
                                tracing::warn!(
                                    target: "hangar::registry",
                                    source = %entry.as_ref(),
                                    field = %field.name(),
                                    reference = %value,
                                    "dropping dangling owned reference"
                                );
                            }
                        }
                    }
                }
                let value = match field.cardinality {
                    Cardinality::One => linked.into_iter().next().unwrap_or(Value::Null),
                    Cardinality::Many => Value::Array(linked),
                };
                record.set(&field.path(), value)?;
            }
            category.wrapper().update(&copy.id, record).await?;

            if dest.copy_metadata() {
                let source_meta = &entry.document().meta;
                let meta = DocumentMeta {
                    name: source_meta.name.clone(),
                    img: source_meta.img.clone(),
                    token: if carries_token(dest.name(), ty.document_kind()) {
                        source_meta.token.clone()
                    } else {
                        None
                    },
                };
                category.wrapper().set_meta(&copy.id, meta).await?;
            }

            Ok(())
        }
        .await;
        if let Err(e) = finished {
            discard_copy(category.wrapper().as_ref(), entry.key(), &copy, ctx).await;
            return Err(e);
        }

        tracing::debug!(
            target: "hangar::registry",
            source = %entry.as_ref(),
            copy = %copy,
            "insinuated"
        );
        Ok(copy)
    })
}

/// Undo a copy that could not be completed
///
/// The insinuation record goes first so a retry in the same context starts
/// over instead of reusing the shell.
async fn discard_copy(
    wrapper: &dyn CollectionWrapper,
    source: &EntryKey,
    copy: &RegRef,
    ctx: &OpCtx,
) {
    ctx.forget_insinuation(source, &copy.registry_name);
    if let Err(e) = wrapper.destroy(&copy.id).await {
        tracing::warn!(
            target: "hangar::registry",
            copy = %copy,
            error = %e,
            "failed to remove incomplete copy"
        );
    }
}

fn empty_slot(cardinality: Cardinality) -> Value {
    match cardinality {
        Cardinality::One => Value::Null,
        Cardinality::Many => Value::Array(Vec::new()),
    }
}

/// Raw value of the `i`th slot of a reference field, if it held anything
fn raw_slot(
    record: &RawRecord,
    path: RecordPath,
    cardinality: Cardinality,
    i: usize,
) -> Option<Value> {
    let value = match cardinality {
        Cardinality::One => record.get(&path)?,
        Cardinality::Many => record.get(&path.index(i))?,
    };
    (!value.is_null()).then(|| value.clone())
}

/// Token metadata only travels to registries holding top-level actors
fn carries_token(dest: &RegistryName, kind: DocumentKind) -> bool {
    kind == DocumentKind::Actor
        && matches!(dest, RegistryName::World | RegistryName::Compendium)
}
