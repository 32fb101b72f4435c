//! Compendium scenarios

use std::io::Write;
use std::sync::Arc;

use hangar::{
    AccessMode, CollectionKey, DocumentKind, DocumentStore, EntityType, Hangar, HangarError,
    MemoryStore, NewDocument, PackInfo, RegistryConfig,
};
use serde_json::json;

use crate::test_utils::{init_tracing, raw, setup};

async fn seed_pack(store: &MemoryStore, pack: &str, lid: &str) -> String {
    store.add_pack(PackInfo::new(pack, pack, DocumentKind::Item));
    store
        .create(
            &CollectionKey::pack(pack, DocumentKind::Item),
            NewDocument::from_record(EntityType::MechSystem, raw(json!({"lid": lid, "name": lid}))),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_locked_pack_is_read_only() {
    let (store, hangar) = setup();
    let id = seed_pack(&store, "core.systems", "ms_shield").await;
    store.set_pack_access("core.systems", AccessMode::ReadOnly);

    let compendium = hangar.compendium().await.unwrap();
    let err = compendium
        .update(EntityType::MechSystem, &id, raw(json!({"name": "changed"})))
        .await
        .unwrap_err();
    assert!(matches!(err, HangarError::ReadOnly { ref pack } if pack == "core.systems"));

    let ctx = hangar.new_ctx();
    let systems = compendium.enumerate(&ctx, EntityType::MechSystem).await.unwrap();
    assert_eq!(systems.len(), 1);

    // New records still go to the unlocked home pack
    let custom = compendium
        .create(EntityType::MechSystem, raw(json!({"name": "Custom"})))
        .await
        .unwrap();
    assert!(compendium
        .get_raw(EntityType::MechSystem, &custom.id)
        .await
        .unwrap()
        .is_some());
}

/// Test: writes made straight to the store show up through the cache
#[tokio::test]
async fn test_external_pack_writes_are_seen() {
    let (store, hangar) = setup();
    seed_pack(&store, "core.systems", "ms_shield").await;
    let compendium = hangar.compendium().await.unwrap();
    let ctx = hangar.new_ctx();
    assert_eq!(compendium.enumerate(&ctx, EntityType::MechSystem).await.unwrap().len(), 1);

    store
        .create(
            &CollectionKey::pack("core.systems", DocumentKind::Item),
            NewDocument::from_record(EntityType::MechSystem, raw(json!({"name": "Flare"}))),
        )
        .await
        .unwrap();
    assert_eq!(compendium.enumerate(&ctx, EntityType::MechSystem).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_pack_restriction_from_config_file() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    seed_pack(&store, "core.systems", "ms_shield").await;
    seed_pack(&store, "homebrew.systems", "ms_brew").await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[compendium]\npacks = [\"homebrew.systems\"]").unwrap();
    let config = RegistryConfig::load(file.path()).unwrap();
    let hangar = Hangar::with_config(store, config);

    let compendium = hangar.compendium().await.unwrap();
    let ctx = hangar.new_ctx();
    let lids: Vec<_> = compendium
        .enumerate(&ctx, EntityType::MechSystem)
        .await
        .unwrap()
        .iter()
        .filter_map(|e| e.data().lid().map(str::to_string))
        .collect();
    assert_eq!(lids, vec!["ms_brew"]);
}
