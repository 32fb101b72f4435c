//! World registry scenarios

use hangar::{
    CollectionKey, DocumentKind, DocumentStore, EntityType, NewDocument, PackInfo, RecordPath,
    RegRef, RegistryName, WriteOutcome,
};
use serde_json::json;

use crate::test_utils::{json_ref, raw, setup};

/// Test: create → enumerate → resolve → mutate → write back → re-read
#[tokio::test]
async fn test_pilot_lifecycle() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();

    let ctx = hangar.new_ctx();
    let pilot = world.create_default(&ctx, EntityType::Pilot).await.unwrap();
    let listed = world.enumerate(&ctx, EntityType::Pilot).await.unwrap();
    assert_eq!(listed.len(), 1);

    let entry = hangar.resolve(&ctx, &pilot.as_ref()).await.unwrap().unwrap();
    assert!(entry.ptr_eq(&pilot));

    let grit: RecordPath = "grit".parse().unwrap();
    entry.set_field(&grit, json!(2)).unwrap();
    assert_eq!(entry.write_back().await.unwrap(), WriteOutcome::Applied);

    // A new operation sees the persisted record
    let next = hangar.new_ctx();
    let reread = hangar.resolve(&next, &pilot.as_ref()).await.unwrap().unwrap();
    assert_eq!(reread.data()["grit"], json!(2));
    assert!(!reread.ptr_eq(&entry));

    world.destroy(EntityType::Pilot, pilot.id()).await.unwrap();
    let after = hangar.new_ctx();
    assert!(hangar.resolve(&after, &pilot.as_ref()).await.unwrap().is_none());
    assert_eq!(entry.write_back().await.unwrap(), WriteOutcome::StaleHandle);
}

/// Test: a world mech points at a frame shipped in a content pack
#[tokio::test]
async fn test_mech_references_compendium_frame() {
    let (store, hangar) = setup();
    store.add_pack(PackInfo::new("core.frames", "Core Frames", DocumentKind::Item));
    let everest = store
        .create(
            &CollectionKey::pack("core.frames", DocumentKind::Item),
            NewDocument::from_record(
                EntityType::Frame,
                raw(json!({"lid": "mf_everest", "name": "Everest"})),
            ),
        )
        .await
        .unwrap();

    let compendium = hangar.compendium().await.unwrap();
    let frame_ref = compendium
        .lookup_by_display_id(EntityType::Frame, "mf_everest")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frame_ref.id, everest.id);

    let world = hangar.world().await.unwrap();
    let mech = world
        .create(
            EntityType::Mech,
            raw(json!({"name": "Mk I", "frame": json_ref(&frame_ref)})),
        )
        .await
        .unwrap();

    let ctx = hangar.new_ctx();
    let entry = hangar.resolve(&ctx, &mech).await.unwrap().unwrap();
    let frame = entry.resolved_one("frame").unwrap();
    assert_eq!(frame.registry_name(), &RegistryName::Compendium);
    assert_eq!(frame.data().lid(), Some("mf_everest"));
}

/// Test: references travel as JSON payloads; malformed ones are no reference
#[tokio::test]
async fn test_reference_payloads() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();
    let skill = world
        .create(EntityType::Skill, raw(json!({"lid": "sk_hack", "name": "Hack"})))
        .await
        .unwrap();

    let payload = serde_json::to_string(&skill).unwrap();
    let dropped: RegRef = serde_json::from_str(&payload).unwrap();
    assert_eq!(dropped.fallback_display_id, "sk_hack");

    let ctx = hangar.new_ctx();
    let entry = hangar.resolve(&ctx, &dropped).await.unwrap().unwrap();
    assert_eq!(entry.id(), skill.id);

    assert!(RegRef::from_json(&json!({"id": "x", "type": "laser", "registry_name": "world"})).is_none());
    assert!(RegRef::from_json(&json!({"id": "x", "type": "skill", "registry_name": "world:x"})).is_none());
}
