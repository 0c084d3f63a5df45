//! Loading and saving: catalogue, configuration, messages and user data.

use std::path::PathBuf;

use enchant_engine::abilities::{AbilityDefinition, AbilityStore, LevelDefinition, Slot};
use enchant_engine::commands::Messages;
use enchant_engine::core::{EngineConfig, EngineError, EntityId, Material, Timestamp};
use enchant_engine::triggers::TriggerKind;
use enchant_engine::users::UserStore;

fn blaze() -> AbilityDefinition {
    AbilityDefinition::new("Blaze", Slot::Held, TriggerKind::OnHit)
        .with_tier("Elite")
        .with_cooldown(5)
        .with_level(1, LevelDefinition::new(15, &["FIRE:2"]))
        .with_level(
            2,
            LevelDefinition::new(25, &["FIRE:4", "LIGHTNING"]).with_condition("TARGET_HEALTH:>:4"),
        )
}

#[test]
fn test_catalogue_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("enchantments.json");

    let mut store = AbilityStore::with_defaults();
    store.insert(blaze()).unwrap();
    store.save(&path).unwrap();

    let loaded = AbilityStore::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("Blaze"), store.get("Blaze"));
    assert_eq!(loaded.get("Speed"), store.get("Speed"));
}

#[test]
fn test_catalogue_from_hand_written_json() {
    let json = r#"{
        "Frost Walker": {
            "slot": "BOOTS",
            "trigger": "PASSIVE",
            "levels": {
                "1": { "chance": 100, "effects": ["REPLACE_NEAR:WATER:ICE:2:3"] },
                "2": { "chance": 100, "effects": ["REPLACE_NEAR:WATER:ICE:3:3"] }
            }
        }
    }"#;
    let store = AbilityStore::from_json(json).unwrap();
    let frost = store.get("frost walker").unwrap();
    assert_eq!(frost.display_name, "Frost Walker");
    assert_eq!(frost.tier, "Common");
    assert_eq!(frost.max_level(), 2);
    assert!(frost.listens_to(TriggerKind::Passive));
}

#[test]
fn test_invalid_catalogue_rejected() {
    let json = r#"{
        "Broken": {
            "slot": "HELD",
            "trigger": "ON_HIT",
            "levels": { "1": { "chance": 150, "effects": ["FIRE:1"] } }
        }
    }"#;
    let err = AbilityStore::from_json(json).unwrap_err();
    assert!(matches!(err, EngineError::InvalidCatalogue { ref ability, .. } if ability == "Broken"));

    let gap = r#"{
        "Gappy": {
            "slot": "HELD",
            "trigger": "ON_HIT",
            "levels": { "1": { "chance": 10 }, "3": { "chance": 10 } }
        }
    }"#;
    assert!(AbilityStore::from_json(gap).is_err());
}

#[test]
fn test_reload_failure_keeps_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enchantments.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let mut store = AbilityStore::with_defaults();
    assert!(matches!(store.reload(&path), Err(EngineError::Json(_))));
    assert!(store.get("Speed").is_some());

    let missing = dir.path().join("missing.json");
    assert!(matches!(store.reload(&missing), Err(EngineError::Io { .. })));
}

#[test]
fn test_load_or_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enchantments.json");

    let first = AbilityStore::load_or_init(&path).unwrap();
    assert!(path.exists());
    let second = AbilityStore::load_or_init(&path).unwrap();
    assert_eq!(first.get("Speed"), second.get("Speed"));
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = EngineConfig {
        prefix: "[CE]".to_string(),
        enchanting_table_max: 5,
        data_dir: PathBuf::from("/srv/enchants"),
        ..EngineConfig::default()
    };
    config
        .smelt
        .insert(Material::new("COBBLESTONE"), Material::new("STONE"));
    config.save(&path).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.smelted(&Material::new("cobblestone")),
        Some(&Material::new("STONE"))
    );
}

#[test]
fn test_messages_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("messages.json");

    let messages = Messages {
        no_permission: "%prefix% &cNo.".to_string(),
        ..Messages::default()
    };
    messages.save(&path).unwrap();
    assert_eq!(Messages::load(&path).unwrap(), messages);
}

#[test]
fn test_user_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.bin");

    let mut users = UserStore::new();
    users.on_join(EntityId(1), "Alex", Timestamp(100));
    users.on_join(EntityId(2), "Sam", Timestamp(200));
    users.record_purchase(EntityId(2));
    users.on_quit(EntityId(1), Timestamp(300));

    let snapshot = users.snapshot();
    // Changes after the snapshot are not part of the save.
    users.on_join(EntityId(3), "Kim", Timestamp(400));
    snapshot.write(&path).unwrap();

    let loaded = UserStore::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.get(EntityId(3)).is_none());
    assert_eq!(loaded.get(EntityId(2)), users.get(EntityId(2)));
    assert_eq!(loaded.get(EntityId(1)).unwrap().last_seen, Timestamp(300));
}

#[test]
fn test_corrupt_user_data_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.bin");
    std::fs::write(&path, [0xff; 3]).unwrap();
    assert!(matches!(UserStore::load(&path), Err(EngineError::Bincode(_))));
}
