//! Insinuation scenarios

use hangar::{EntityType, RegistryName};
use serde_json::json;

use crate::test_utils::{json_ref, raw, setup};

/// Test: world pilot → compendium → world produces independent copies
#[tokio::test]
async fn test_pilot_round_trip_through_compendium() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();
    let compendium = hangar.compendium().await.unwrap();

    let pilot = world
        .create(EntityType::Pilot, raw(json!({"name": "Ace", "callsign": "Maverick"})))
        .await
        .unwrap();
    let inventory = hangar
        .switch(&RegistryName::WorldActor(pilot.id.clone()))
        .await
        .unwrap()
        .unwrap();
    let skill = inventory
        .create(EntityType::Skill, raw(json!({"name": "Hack"})))
        .await
        .unwrap();
    let talent = inventory
        .create(EntityType::Talent, raw(json!({"name": "Ace"})))
        .await
        .unwrap();
    let mut data = world.get_raw(EntityType::Pilot, &pilot.id).await.unwrap().unwrap();
    data["skills"] = json!([json_ref(&skill)]);
    data["talents"] = json!([json_ref(&talent)]);
    world.update(EntityType::Pilot, &pilot.id, data).await.unwrap();
    let source_before = world.get_raw(EntityType::Pilot, &pilot.id).await.unwrap();

    let ctx = hangar.new_ctx();
    let entry = hangar.resolve(&ctx, &pilot).await.unwrap().unwrap();
    let archived = world.insinuate(&entry, &compendium, &ctx).await.unwrap();
    assert_eq!(archived.registry_name(), &RegistryName::Compendium);
    assert_eq!(archived.data()["callsign"], json!("Maverick"));
    assert!(archived.resolved_one("skills").is_some());
    assert!(archived.resolved_one("talents").is_some());

    // Restore in a separate operation
    let restore = hangar.new_ctx();
    let from_pack = compendium
        .resolve(&restore, &archived.as_ref())
        .await
        .unwrap()
        .unwrap();
    let restored = compendium.insinuate(&from_pack, &world, &restore).await.unwrap();
    assert_eq!(restored.registry_name(), &RegistryName::World);
    assert_ne!(restored.id(), pilot.id);
    assert_ne!(restored.id(), archived.id());
    let restored_skill = restored.resolved_one("skills").unwrap();
    assert_eq!(restored_skill.registry_name(), &RegistryName::World);
    assert_eq!(restored_skill.data().name(), Some("Hack"));

    assert_eq!(world.get_raw(EntityType::Pilot, &pilot.id).await.unwrap(), source_before);
    assert_eq!(world.enumerate(&restore, EntityType::Pilot).await.unwrap().len(), 2);
    assert_eq!(inventory.enumerate(&restore, EntityType::Skill).await.unwrap().len(), 1);
}

/// Test: a weapon with mods lands in another actor's inventory with its mods
#[tokio::test]
async fn test_weapon_with_mods_into_inventory() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();
    let owner = world
        .create(EntityType::Mech, raw(json!({"name": "Mk I"})))
        .await
        .unwrap();
    let nexus = world
        .create(EntityType::WeaponMod, raw(json!({"name": "Nanocomposite"})))
        .await
        .unwrap();
    let rifle = world
        .create(
            EntityType::MechWeapon,
            raw(json!({"name": "Rifle", "mods": [json_ref(&nexus)]})),
        )
        .await
        .unwrap();

    let hangar_bay = hangar
        .switch(&RegistryName::Actor(owner.id.clone()))
        .await
        .unwrap()
        .unwrap();
    let ctx = hangar.new_ctx();
    let entry = hangar.resolve(&ctx, &rifle).await.unwrap().unwrap();
    let copy = world.insinuate(&entry, &hangar_bay, &ctx).await.unwrap();

    assert_eq!(copy.registry_name(), &RegistryName::WorldActor(owner.id.clone()));
    let copied_mod = copy.resolved_one("mods").unwrap();
    assert_eq!(copied_mod.registry_name(), copy.registry_name());
    assert_eq!(hangar_bay.enumerate(&ctx, EntityType::MechWeapon).await.unwrap().len(), 1);
    assert_eq!(hangar_bay.enumerate(&ctx, EntityType::WeaponMod).await.unwrap().len(), 1);
    assert_eq!(world.enumerate(&ctx, EntityType::WeaponMod).await.unwrap().len(), 1);
}
