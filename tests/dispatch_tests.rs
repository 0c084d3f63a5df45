//! Trigger dispatch integration tests.
//!
//! These drive a full `EnchantEngine` against the in-memory world and check
//! the observable outcomes of abilities firing.

use std::sync::Arc;

use proptest::prelude::*;

use enchant_engine::abilities::{AbilityDefinition, LevelDefinition, Slot};
use enchant_engine::conditions::{Comparator, ConditionContext, ConditionEvaluator};
use enchant_engine::core::{
    EngineConfig, EngineRng, EntityId, EntityKind, EquipmentSlot, ItemStack, Location, ManualClock,
    PotionType, Timestamp,
};
use enchant_engine::effects::ExecOutcome;
use enchant_engine::engine::EnchantEngine;
use enchant_engine::grammar::{EffectKind, EncodedInstruction};
use enchant_engine::sim::SimWorld;
use enchant_engine::triggers::{ActivationOutcome, Fizzle, GameEvent, TriggerKind};

fn engine(seed: u64) -> EnchantEngine {
    let clock = ManualClock::new(Timestamp(0));
    EnchantEngine::new(EngineConfig::default(), Arc::new(clock), EngineRng::new(seed))
}

fn arena() -> (SimWorld, EntityId, EntityId) {
    let mut world = SimWorld::new();
    let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
    let zombie = world.spawn(EntityKind::Zombie, Location::new(2.0, 64.0, 0.0));
    (world, player, zombie)
}

fn hit(attacker: EntityId, victim: EntityId) -> GameEvent {
    GameEvent::EntityDamage {
        attacker,
        victim,
        damage: 5.0,
    }
}

/// Speed II boots apply Speed with amplifier 1 on a passive event.
#[test]
fn test_speed_boots_passive() {
    let mut engine = engine(1);
    let (mut world, player, _) = arena();
    world.equip(
        player,
        EquipmentSlot::Boots,
        ItemStack::new("DIAMOND_BOOTS", 1).with_enchant("Speed", 2),
    );

    let report = engine.handle_event(&mut world, &GameEvent::Passive { actor: player });

    assert_eq!(report.fired_count(), 1);
    let potions = world.potions(player);
    assert_eq!(potions.len(), 1);
    assert_eq!(potions[0].kind, PotionType::Speed);
    assert_eq!(potions[0].amplifier, 1);
    assert_eq!(potions[0].duration_ticks, 100 * 20);
}

/// Speed on a sword does nothing: the item is not in an accepted slot.
#[test]
fn test_speed_in_hand_ignored() {
    let mut engine = engine(1);
    let (mut world, player, _) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("DIAMOND_SWORD", 1).with_enchant("Speed", 2),
    );

    let report = engine.handle_event(&mut world, &GameEvent::Passive { actor: player });

    assert!(report.activations.is_empty());
    assert!(world.potions(player).is_empty());
}

/// A 30% ability fires roughly 30% of the time over many trials.
#[test]
fn test_chance_proportion() {
    let mut engine = engine(2024);
    engine
        .store_mut()
        .insert(
            AbilityDefinition::new("Lucky", Slot::Held, TriggerKind::OnHit)
                .with_level(1, LevelDefinition::new(30, &["EXPERIENCE:1"])),
        )
        .unwrap();
    let (mut world, player, zombie) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("IRON_SWORD", 1).with_enchant("Lucky", 1),
    );

    let trials = 10_000;
    let fired: usize = (0..trials)
        .map(|_| engine.handle_event(&mut world, &hit(player, zombie)).fired_count())
        .sum();

    let rate = fired as f64 / trials as f64;
    assert!((0.27..=0.33).contains(&rate), "fire rate {rate}");
    assert_eq!(world.entity(player).unwrap().experience, fired as u32);
}

/// Weight 0 never fires and weight 100 always fires.
#[test]
fn test_chance_bounds() {
    let mut engine = engine(5);
    for (name, chance) in [("Never", 0), ("Always", 100)] {
        engine
            .store_mut()
            .insert(
                AbilityDefinition::new(name, Slot::Held, TriggerKind::OnHit)
                    .with_level(1, LevelDefinition::new(chance, &["EXPERIENCE:1"])),
            )
            .unwrap();
    }
    let (mut world, player, zombie) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("IRON_SWORD", 1)
            .with_enchant("Never", 1)
            .with_enchant("Always", 1),
    );

    for _ in 0..500 {
        let report = engine.handle_event(&mut world, &hit(player, zombie));
        for activation in &report.activations {
            match activation.ability.as_str() {
                "Always" => assert!(activation.fired()),
                "Never" => assert_eq!(
                    activation.outcome,
                    ActivationOutcome::Fizzled(Fizzle::ChanceRoll)
                ),
                other => panic!("unexpected ability {other}"),
            }
        }
    }
    assert_eq!(world.entity(player).unwrap().experience, 500);
}

/// An unknown instruction is a no-op; the rest of the script still runs.
#[test]
fn test_unknown_effect_is_noop() {
    let mut engine = engine(3);
    engine
        .store_mut()
        .insert(
            AbilityDefinition::new("Odd", Slot::Held, TriggerKind::OnHit)
                .with_level(1, LevelDefinition::new(100, &["TELEPORT_HOME:1", "EXPERIENCE:7"])),
        )
        .unwrap();
    let (mut world, player, zombie) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("IRON_SWORD", 1).with_enchant("Odd", 1),
    );

    let report = engine.handle_event(&mut world, &hit(player, zombie));

    let fired: Vec<_> = report.fired().collect();
    assert_eq!(fired.len(), 1);
    assert_eq!(
        fired[0].outcome,
        ActivationOutcome::Fired(vec![
            ExecOutcome::Unknown,
            ExecOutcome::Applied(EffectKind::Experience),
        ])
    );
    assert_eq!(world.entity(player).unwrap().experience, 7);
}

/// A damage modifier rewrites the damage the host applies.
#[test]
fn test_damage_modifier_reaches_payload() {
    let mut engine = engine(3);
    engine
        .store_mut()
        .insert(
            AbilityDefinition::new("Sharp", Slot::Held, TriggerKind::OnHit)
                .with_level(1, LevelDefinition::new(100, &["DAMAGE_MODIFIER:1.5"])),
        )
        .unwrap();
    let (mut world, player, zombie) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("IRON_SWORD", 1).with_enchant("Sharp", 1),
    );

    let report = engine.handle_event(&mut world, &hit(player, zombie));
    assert_eq!(report.payload.damage, Some(7.5));
}

/// A condition that fails stops the ability before any effect.
#[test]
fn test_condition_gate() {
    let mut engine = engine(3);
    engine
        .store_mut()
        .insert(
            AbilityDefinition::new("Last Stand", Slot::Held, TriggerKind::OnHit).with_level(
                1,
                LevelDefinition::new(100, &["HEAL:4"]).with_condition("PLAYER_HEALTH:<:6"),
            ),
        )
        .unwrap();
    let (mut world, player, zombie) = arena();
    world.equip(
        player,
        EquipmentSlot::MainHand,
        ItemStack::new("IRON_SWORD", 1).with_enchant("Last Stand", 1),
    );

    let report = engine.handle_event(&mut world, &hit(player, zombie));
    assert_eq!(report.activations[0].outcome, ActivationOutcome::Fizzled(Fizzle::Conditions));

    world.entity_mut(player).unwrap().health = 5.0;
    let report = engine.handle_event(&mut world, &hit(player, zombie));
    assert_eq!(report.fired_count(), 1);
    assert_eq!(world.entity(player).unwrap().health, 9.0);
}

proptest! {
    /// `PLAYER_HEALTH:<op>:<value>` agrees with the numeric comparison.
    #[test]
    fn prop_health_comparators(health in 0.0f64..40.0, threshold in -5i64..40, index in 0usize..6) {
        let (op, token) = Comparator::ALL[index];
        let mut world = SimWorld::new();
        let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
        world.entity_mut(player).unwrap().health = health;

        let instruction = EncodedInstruction::parse(format!("PLAYER_HEALTH:{token}:{threshold}"));
        let ctx = ConditionContext::new(&world, player, player);
        prop_assert_eq!(
            ConditionEvaluator::evaluate_instruction(&instruction, &ctx),
            op.compare(health, threshold as f64)
        );
    }

    /// Thresholds with a fractional part read as 1.
    #[test]
    fn prop_fractional_threshold_reads_as_one(health in 0.0f64..40.0, whole in 0u32..40, frac in 1u32..10) {
        let mut world = SimWorld::new();
        let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
        world.entity_mut(player).unwrap().health = health;

        let instruction = EncodedInstruction::parse(format!("PLAYER_HEALTH:<:{whole}.{frac}"));
        let ctx = ConditionContext::new(&world, player, player);
        prop_assert_eq!(ConditionEvaluator::evaluate_instruction(&instruction, &ctx), health < 1.0);
    }

    /// Unknown operators always pass.
    #[test]
    fn prop_unknown_operator_passes(health in 0.0f64..40.0, op in "[a-z~]{1,3}") {
        let mut world = SimWorld::new();
        let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
        world.entity_mut(player).unwrap().health = health;

        let instruction = EncodedInstruction::parse(format!("TARGET_HEALTH:{op}:10"));
        let ctx = ConditionContext::new(&world, player, player);
        prop_assert!(ConditionEvaluator::evaluate_instruction(&instruction, &ctx));
    }
}
