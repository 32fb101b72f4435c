//! Actor inventory scenarios

use hangar::{EntityType, RegistryName};
use serde_json::json;

use crate::test_utils::{json_ref, raw, setup};

/// Test: a pilot's loadout lives in its inventory and resolves from the world
#[tokio::test]
async fn test_pilot_loadout_in_inventory() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();
    let pilot = world
        .create(EntityType::Pilot, raw(json!({"name": "Ace"})))
        .await
        .unwrap();
    let rival = world
        .create(EntityType::Pilot, raw(json!({"name": "Rival"})))
        .await
        .unwrap();

    let inventory = hangar
        .switch(&RegistryName::Actor(pilot.id.clone()))
        .await
        .unwrap()
        .unwrap();
    let pistol = inventory
        .create(EntityType::PilotWeapon, raw(json!({"name": "Pistol"})))
        .await
        .unwrap();
    let armor = inventory
        .create(EntityType::PilotArmor, raw(json!({"name": "Light Hardsuit"})))
        .await
        .unwrap();
    let rival_inventory = hangar
        .switch(&RegistryName::WorldActor(rival.id.clone()))
        .await
        .unwrap()
        .unwrap();
    rival_inventory
        .create(EntityType::PilotWeapon, raw(json!({"name": "Knife"})))
        .await
        .unwrap();

    let mut data = world.get_raw(EntityType::Pilot, &pilot.id).await.unwrap().unwrap();
    data["loadout"]["weapons"] = json!([json_ref(&pistol)]);
    data["loadout"]["armor"] = json!([json_ref(&armor)]);
    world.update(EntityType::Pilot, &pilot.id, data).await.unwrap();

    let ctx = hangar.new_ctx();
    let entry = hangar.resolve(&ctx, &pilot).await.unwrap().unwrap();
    let weapon = entry.resolved_one("loadout.weapons").unwrap();
    assert_eq!(weapon.data().name(), Some("Pistol"));
    assert_eq!(weapon.registry_name(), &RegistryName::WorldActor(pilot.id.clone()));
    assert!(entry.resolved_one("loadout.armor").is_some());

    let weapons = inventory.enumerate(&ctx, EntityType::PilotWeapon).await.unwrap();
    assert_eq!(weapons.len(), 1);
}

/// Test: deleting the owner takes the inventory with it
#[tokio::test]
async fn test_deleting_owner_drops_inventory() {
    let (_store, hangar) = setup();
    let world = hangar.world().await.unwrap();
    let pilot = world
        .create(EntityType::Pilot, raw(json!({"name": "Ace"})))
        .await
        .unwrap();
    let name = RegistryName::WorldActor(pilot.id.clone());
    let inventory = hangar.switch(&name).await.unwrap().unwrap();
    let talent = inventory
        .create(EntityType::Talent, raw(json!({"name": "Ace"})))
        .await
        .unwrap();

    world.destroy(EntityType::Pilot, &pilot.id).await.unwrap();
    assert!(inventory
        .get_raw(EntityType::Talent, &talent.id)
        .await
        .unwrap()
        .is_none());

    hangar.registries().forget(&name);
    assert!(hangar.switch(&name).await.unwrap().is_none());
    let ctx = hangar.new_ctx();
    assert!(hangar.resolve(&ctx, &talent).await.unwrap().is_none());
}
